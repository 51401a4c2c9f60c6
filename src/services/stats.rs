use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::db::CatalogEntry;
use crate::services::similarity::normalize;

/// Statistics only count watched rows (pendiente = false).
fn watched(entries: &[CatalogEntry]) -> impl Iterator<Item = &CatalogEntry> {
    entries.iter().filter(|e| !e.pendiente)
}

#[must_use]
pub fn count(entries: &[CatalogEntry], tipo: Option<&str>, pendiente: Option<bool>) -> usize {
    entries
        .iter()
        .filter(|e| pendiente.is_none_or(|p| e.pendiente == p))
        .filter(|e| {
            tipo.is_none_or(|t| normalize(&e.media.tipo) == normalize(t))
        })
        .count()
}

#[derive(Debug, Clone, Serialize)]
pub struct TopEntry {
    pub id: i32,
    pub titulo: String,
    pub nota_personal: f32,
    pub anio: Option<i32>,
    pub tipo: String,
}

/// Five best-rated watched titles of a tipo.
#[must_use]
pub fn top5(entries: &[CatalogEntry], tipo: &str) -> Vec<TopEntry> {
    let tipo_norm = normalize(tipo);
    let mut rated: Vec<&CatalogEntry> = watched(entries)
        .filter(|e| e.nota_personal.is_some())
        .filter(|e| normalize(&e.media.tipo) == tipo_norm)
        .collect();

    rated.sort_by(|a, b| {
        b.nota_personal
            .unwrap_or(0.0)
            .total_cmp(&a.nota_personal.unwrap_or(0.0))
    });

    rated
        .into_iter()
        .take(5)
        .map(|e| TopEntry {
            id: e.media.id,
            titulo: e.media.titulo.clone(),
            nota_personal: e.nota_personal.unwrap_or(0.0),
            anio: e.media.anio,
            tipo: e.media.tipo.clone(),
        })
        .collect()
}

/// Worst-rated watched title of a tipo.
#[must_use]
pub fn peor(entries: &[CatalogEntry], tipo: &str) -> Option<CatalogEntry> {
    let tipo_norm = normalize(tipo);
    watched(entries)
        .filter(|e| e.nota_personal.is_some())
        .filter(|e| normalize(&e.media.tipo) == tipo_norm)
        .min_by(|a, b| {
            a.nota_personal
                .unwrap_or(0.0)
                .total_cmp(&b.nota_personal.unwrap_or(0.0))
        })
        .cloned()
}

struct GenreBuckets {
    counts: HashMap<String, usize>,
    original_names: HashMap<String, String>,
    ratings: HashMap<String, Vec<f32>>,
}

fn genre_buckets(entries: &[CatalogEntry]) -> GenreBuckets {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut original_names: HashMap<String, String> = HashMap::new();
    let mut ratings: HashMap<String, Vec<f32>> = HashMap::new();

    for entry in watched(entries) {
        let genero = entry.media.genero.as_deref().unwrap_or_default();
        for raw in genero.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let key = normalize(raw);
            *counts.entry(key.clone()).or_default() += 1;
            original_names
                .entry(key.clone())
                .or_insert_with(|| raw.to_string());
            if let Some(nota) = entry.nota_personal {
                ratings.entry(key).or_default().push(nota);
            }
        }
    }

    GenreBuckets {
        counts,
        original_names,
        ratings,
    }
}

/// Genre name -> watched count.
#[must_use]
pub fn distribucion_generos(entries: &[CatalogEntry]) -> HashMap<String, usize> {
    let buckets = genre_buckets(entries);
    buckets
        .counts
        .into_iter()
        .map(|(key, count)| {
            let name = buckets
                .original_names
                .get(&key)
                .cloned()
                .unwrap_or(key);
            (name, count)
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerosVistos {
    pub mas_visto: String,
    pub mas_visto_count: usize,
    pub mejor_valorado: String,
    pub mejor_valorado_media: Option<f32>,
}

/// Most-watched genre and best personally-rated genre.
#[must_use]
pub fn generos_vistos(entries: &[CatalogEntry]) -> GenerosVistos {
    let buckets = genre_buckets(entries);
    let mut result = GenerosVistos::default();

    if let Some((key, count)) = buckets
        .counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
    {
        result.mas_visto = buckets
            .original_names
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.clone());
        result.mas_visto_count = *count;
    }

    let mut candidates: Vec<(&String, f32, usize)> = buckets
        .ratings
        .iter()
        .map(|(key, notas)| {
            let avg = notas.iter().sum::<f32>() / notas.len() as f32;
            (key, avg, notas.len())
        })
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.2.cmp(&a.2)));

    if let Some((key, avg, _)) = candidates.first() {
        result.mejor_valorado = buckets
            .original_names
            .get(*key)
            .cloned()
            .unwrap_or_else(|| (*key).clone());
        result.mejor_valorado_media = Some((avg * 100.0).round() / 100.0);
    }

    result
}

/// Watched count per release year, ordered ascending.
#[must_use]
pub fn vistos_por_anio(entries: &[CatalogEntry]) -> BTreeMap<i32, usize> {
    let mut conteo = BTreeMap::new();
    for entry in watched(entries) {
        if let Some(anio) = entry.media.anio {
            *conteo.entry(anio).or_default() += 1;
        }
    }
    conteo
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TopPersonas {
    pub top_actores: Vec<(String, usize)>,
    pub top_directores: Vec<(String, usize)>,
}

fn most_common(names: &[String], n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    let mut pairs: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.truncate(n);
    pairs
}

/// Most frequent cast members and directors across the watched catalog.
#[must_use]
pub fn top_personas(entries: &[CatalogEntry]) -> TopPersonas {
    let mut actores: Vec<String> = Vec::new();
    let mut directores: Vec<String> = Vec::new();

    for entry in watched(entries) {
        for name in entry
            .media
            .elenco
            .as_deref()
            .unwrap_or_default()
            .split(',')
        {
            let name = name.trim();
            if !name.is_empty() {
                actores.push(name.to_string());
            }
        }
        for name in entry
            .media
            .director
            .as_deref()
            .unwrap_or_default()
            .split(',')
        {
            let name = name.trim();
            if !name.is_empty() {
                directores.push(name.to_string());
            }
        }
    }

    TopPersonas {
        top_actores: most_common(&actores, 5),
        top_directores: most_common(&directores, 5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MediaRow;

    fn entry(
        id: i32,
        tipo: &str,
        genero: &str,
        nota_personal: Option<f32>,
        pendiente: bool,
    ) -> CatalogEntry {
        CatalogEntry {
            media: MediaRow {
                id,
                tmdb_id: None,
                titulo: format!("Title {id}"),
                anio: Some(2000 + id),
                genero: Some(genero.to_string()),
                sinopsis: None,
                director: Some("Jane Doe".to_string()),
                elenco: Some("Actor A, Actor B".to_string()),
                imagen: None,
                tipo: tipo.to_string(),
                temporadas: None,
                episodios: None,
                nota_imdb: None,
                original_title: None,
                runtime: None,
                production_countries: None,
                status: None,
                certification: None,
                first_air_date: None,
                last_air_date: None,
                episode_runtime: None,
                last_updated_tmdb: None,
                auto_update_enabled: true,
                needs_update: false,
            },
            nota_personal,
            anotacion_personal: None,
            favorito: false,
            pendiente,
            fecha_agregado: String::new(),
        }
    }

    #[test]
    fn test_count_filters_tipo_and_pendiente() {
        let entries = vec![
            entry(1, "pelicula", "Drama", None, false),
            entry(2, "serie", "Drama", None, false),
            entry(3, "pelicula", "Drama", None, true),
        ];
        assert_eq!(count(&entries, None, None), 3);
        assert_eq!(count(&entries, Some("pelicula"), None), 2);
        assert_eq!(count(&entries, Some("película"), Some(false)), 1);
        assert_eq!(count(&entries, None, Some(true)), 1);
    }

    #[test]
    fn test_top5_orders_and_skips_pending() {
        let entries = vec![
            entry(1, "pelicula", "Drama", Some(6.0), false),
            entry(2, "pelicula", "Drama", Some(9.0), false),
            entry(3, "pelicula", "Drama", Some(10.0), true),
            entry(4, "pelicula", "Drama", None, false),
            entry(5, "serie", "Drama", Some(8.0), false),
        ];
        let top = top5(&entries, "pelicula");
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, 2);
        assert_eq!(top[1].id, 1);
    }

    #[test]
    fn test_peor_picks_minimum() {
        let entries = vec![
            entry(1, "serie", "Drama", Some(3.0), false),
            entry(2, "serie", "Drama", Some(7.5), false),
        ];
        assert_eq!(peor(&entries, "serie").unwrap().media.id, 1);
        assert!(peor(&entries, "pelicula").is_none());
    }

    #[test]
    fn test_distribucion_generos_splits_and_counts() {
        let entries = vec![
            entry(1, "pelicula", "Drama, Crimen", None, false),
            entry(2, "pelicula", "Drama", None, false),
            entry(3, "pelicula", "Comedia", None, true),
        ];
        let dist = distribucion_generos(&entries);
        assert_eq!(dist.get("Drama"), Some(&2));
        assert_eq!(dist.get("Crimen"), Some(&1));
        assert!(!dist.contains_key("Comedia"));
    }

    #[test]
    fn test_generos_vistos() {
        let entries = vec![
            entry(1, "pelicula", "Drama", Some(9.0), false),
            entry(2, "pelicula", "Drama", Some(5.0), false),
            entry(3, "pelicula", "Comedia", Some(8.0), false),
        ];
        let gv = generos_vistos(&entries);
        assert_eq!(gv.mas_visto, "Drama");
        assert_eq!(gv.mas_visto_count, 2);
        assert_eq!(gv.mejor_valorado, "Comedia");
        assert_eq!(gv.mejor_valorado_media, Some(8.0));
    }

    #[test]
    fn test_vistos_por_anio_sorted() {
        let entries = vec![
            entry(5, "pelicula", "", None, false),
            entry(1, "pelicula", "", None, false),
            entry(2, "pelicula", "", None, false),
        ];
        let years: Vec<i32> = vistos_por_anio(&entries).keys().copied().collect();
        assert_eq!(years, vec![2001, 2002, 2005]);
    }

    #[test]
    fn test_top_personas_counts() {
        let entries = vec![
            entry(1, "pelicula", "", None, false),
            entry(2, "pelicula", "", None, false),
        ];
        let top = top_personas(&entries);
        assert_eq!(top.top_directores[0], ("Jane Doe".to_string(), 2));
        assert!(top.top_actores.iter().any(|(n, c)| n == "Actor A" && *c == 2));
    }
}
