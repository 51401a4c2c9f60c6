use std::collections::{HashMap, HashSet};

use crate::db::CatalogEntry;

/// Default number of similar titles returned.
pub const DEFAULT_SIMILAR_LIMIT: usize = 24;

const GENRE_POINTS: i32 = 3;
const TAG_POINTS: i32 = 2;
const KEYWORD_POINTS: i32 = 2;
const DIRECTOR_POINTS: i32 = 4;
const YEAR_CLOSE_POINTS: i32 = 2;
const YEAR_NEAR_POINTS: i32 = 1;
const RATING_POINTS: i32 = 1;

#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: CatalogEntry,
    pub score: i32,
}

/// Lowercased, accent-insensitive comparison key for genre and tipo strings.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            _ => c,
        })
        .collect()
}

/// Split a comma-separated genre string into normalized tokens.
#[must_use]
pub fn genre_tokens(genero: Option<&str>) -> HashSet<String> {
    genero
        .unwrap_or_default()
        .split(',')
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect()
}

fn shared_count(a: &[i32], b: &[i32]) -> i32 {
    let set: HashSet<i32> = a.iter().copied().collect();
    b.iter().filter(|id| set.contains(id)).count() as i32
}

/// Score one candidate against the source title.
#[must_use]
pub fn score_candidate(
    source: &CatalogEntry,
    source_genres: &HashSet<String>,
    source_tags: &[i32],
    source_keywords: &[i32],
    candidate: &CatalogEntry,
    candidate_tags: &[i32],
    candidate_keywords: &[i32],
) -> i32 {
    let mut score = 0;

    let candidate_genres = genre_tokens(candidate.media.genero.as_deref());
    score += source_genres.intersection(&candidate_genres).count() as i32 * GENRE_POINTS;

    score += shared_count(source_tags, candidate_tags) * TAG_POINTS;
    score += shared_count(source_keywords, candidate_keywords) * KEYWORD_POINTS;

    if let (Some(a), Some(b)) = (
        source.media.director.as_deref(),
        candidate.media.director.as_deref(),
    ) && !a.trim().is_empty()
        && normalize(a) == normalize(b)
    {
        score += DIRECTOR_POINTS;
    }

    if let (Some(a), Some(b)) = (source.media.anio, candidate.media.anio) {
        let diff = (a - b).abs();
        if diff <= 5 {
            score += YEAR_CLOSE_POINTS;
        } else if diff <= 10 {
            score += YEAR_NEAR_POINTS;
        }
    }

    if let (Some(a), Some(b)) = (source.media.nota_imdb, candidate.media.nota_imdb)
        && (a - b).abs() <= 0.5
    {
        score += RATING_POINTS;
    }

    score
}

/// Rank the user's other catalog rows by similarity to the source title.
///
/// Candidates that share nothing score zero; when nothing scores above zero
/// the ranking falls back to plain genre overlap ordered by TMDb rating.
#[must_use]
pub fn similares(
    source: &CatalogEntry,
    candidates: &[CatalogEntry],
    tags_by_media: &HashMap<i32, Vec<i32>>,
    keywords_by_media: &HashMap<i32, Vec<i32>>,
    limit: usize,
) -> Vec<ScoredEntry> {
    let empty: Vec<i32> = vec![];
    let source_genres = genre_tokens(source.media.genero.as_deref());
    let source_tags = tags_by_media.get(&source.media.id).unwrap_or(&empty);
    let source_keywords = keywords_by_media.get(&source.media.id).unwrap_or(&empty);

    let mut scored: Vec<ScoredEntry> = candidates
        .iter()
        .filter(|c| c.media.id != source.media.id)
        .map(|c| {
            let candidate_tags = tags_by_media.get(&c.media.id).unwrap_or(&empty);
            let candidate_keywords = keywords_by_media.get(&c.media.id).unwrap_or(&empty);
            ScoredEntry {
                entry: c.clone(),
                score: score_candidate(
                    source,
                    &source_genres,
                    source_tags,
                    source_keywords,
                    c,
                    candidate_tags,
                    candidate_keywords,
                ),
            }
        })
        .collect();

    if scored.iter().any(|s| s.score > 0) {
        scored.retain(|s| s.score > 0);
        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| {
                    b.entry
                        .media
                        .nota_imdb
                        .unwrap_or(0.0)
                        .total_cmp(&a.entry.media.nota_imdb.unwrap_or(0.0))
                })
                .then_with(|| a.entry.media.id.cmp(&b.entry.media.id))
        });
        scored.truncate(limit);
        return scored;
    }

    // Genre-only fallback: looser substring matching, so "Sci-Fi & Fantasy"
    // still pairs with "Fantasy" when exact token overlap found nothing.
    let mut fallback: Vec<ScoredEntry> = scored
        .into_iter()
        .filter(|s| {
            let candidate_genero = normalize(s.entry.media.genero.as_deref().unwrap_or_default());
            source_genres.iter().any(|g| {
                !candidate_genero.is_empty()
                    && (candidate_genero.contains(g.as_str()) || g.contains(&candidate_genero))
            })
        })
        .collect();

    fallback.sort_by(|a, b| {
        b.entry
            .media
            .nota_imdb
            .unwrap_or(0.0)
            .total_cmp(&a.entry.media.nota_imdb.unwrap_or(0.0))
            .then_with(|| a.entry.media.id.cmp(&b.entry.media.id))
    });
    fallback.truncate(limit);
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MediaRow;

    fn entry(id: i32, genero: &str, director: &str, anio: i32, nota: f32) -> CatalogEntry {
        CatalogEntry {
            media: MediaRow {
                id,
                tmdb_id: Some(id),
                titulo: format!("Title {id}"),
                anio: Some(anio),
                genero: Some(genero.to_string()),
                sinopsis: None,
                director: if director.is_empty() {
                    None
                } else {
                    Some(director.to_string())
                },
                elenco: None,
                imagen: None,
                tipo: "pelicula".to_string(),
                temporadas: None,
                episodios: None,
                nota_imdb: Some(nota),
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
            nota_personal: None,
            anotacion_personal: None,
            favorito: false,
            pendiente: false,
            fecha_agregado: String::new(),
        }
    }

    #[test]
    fn test_same_director_outranks_single_genre() {
        let source = entry(1, "Drama", "Jane Doe", 2000, 7.0);
        let by_director = entry(2, "Comedia", "Jane Doe", 2020, 3.0);
        let by_genre = entry(3, "Drama", "Other", 2020, 3.0);

        let result = similares(
            &source,
            &[by_director.clone(), by_genre],
            &HashMap::new(),
            &HashMap::new(),
            10,
        );

        assert_eq!(result[0].entry.media.id, 2);
        assert_eq!(result[0].score, DIRECTOR_POINTS);
    }

    #[test]
    fn test_year_proximity_tiers() {
        let source = entry(1, "", "", 2000, 1.0);
        let close = entry(2, "", "", 2003, 9.0);
        let near = entry(3, "", "", 2008, 9.0);
        let far = entry(4, "", "", 2020, 9.0);

        let sg = genre_tokens(source.media.genero.as_deref());
        assert_eq!(
            score_candidate(&source, &sg, &[], &[], &close, &[], &[]),
            YEAR_CLOSE_POINTS
        );
        assert_eq!(
            score_candidate(&source, &sg, &[], &[], &near, &[], &[]),
            YEAR_NEAR_POINTS
        );
        assert_eq!(score_candidate(&source, &sg, &[], &[], &far, &[], &[]), 0);
    }

    #[test]
    fn test_shared_tags_and_keywords_add_points() {
        let source = entry(1, "", "", 1990, 5.0);
        let candidate = entry(2, "", "", 1960, 9.0);

        let mut tags = HashMap::new();
        tags.insert(1, vec![10, 11]);
        tags.insert(2, vec![11, 12]);

        let mut kws = HashMap::new();
        kws.insert(1, vec![100]);
        kws.insert(2, vec![100]);

        let result = similares(&source, &[candidate], &tags, &kws, 10);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].score, TAG_POINTS + KEYWORD_POINTS);
    }

    #[test]
    fn test_genre_fallback_uses_substring_match() {
        // Token sets are disjoint ("sci-fi & fantasy" vs "fantasy") so the
        // primary pass scores zero; the fallback still pairs them up.
        let mut source = entry(1, "Sci-Fi & Fantasy", "", 1950, 2.0);
        source.media.anio = None;
        source.media.nota_imdb = None;

        let mut low = entry(2, "Fantasy", "", 1990, 6.0);
        let mut high = entry(3, "Fantasy", "", 1990, 8.0);
        let mut unrelated = entry(4, "Comedia", "", 1990, 9.9);
        low.media.anio = None;
        high.media.anio = None;
        unrelated.media.anio = None;

        let result = similares(
            &source,
            &[low, high, unrelated],
            &HashMap::new(),
            &HashMap::new(),
            10,
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].entry.media.id, 3);
        assert_eq!(result[1].entry.media.id, 2);
        assert!(result.iter().all(|s| s.score == 0));
    }

    #[test]
    fn test_no_overlap_returns_empty() {
        let mut source = entry(1, "Noir", "", 1950, 2.0);
        source.media.anio = None;
        source.media.nota_imdb = None;
        let mut other = entry(2, "Comedia", "", 1990, 6.0);
        other.media.anio = None;

        let result = similares(&source, &[other], &HashMap::new(), &HashMap::new(), 10);
        assert!(result.is_empty());
    }

    #[test]
    fn test_limit_and_source_exclusion() {
        let source = entry(1, "Drama", "", 2000, 7.0);
        let candidates: Vec<CatalogEntry> = (2..30)
            .map(|i| entry(i, "Drama", "", 2000, 5.0))
            .collect();

        let mut all = candidates.clone();
        all.push(source.clone());

        let result = similares(&source, &all, &HashMap::new(), &HashMap::new(), 24);
        assert_eq!(result.len(), 24);
        assert!(result.iter().all(|s| s.entry.media.id != 1));
    }

    #[test]
    fn test_normalize_folds_accents() {
        assert_eq!(normalize("Película"), "pelicula");
        assert_eq!(normalize("  Acción "), "accion");
    }
}
