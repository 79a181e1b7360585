//! Movie catalog data models

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub summary: String,
    pub director: String,
    /// Free-form text, clients send things like "2020" or "1979/1980"
    pub year: String,
    pub image: String,
    /// Unix timestamp of catalog insertion
    pub created: i64,
}

/// A fully validated movie ready for insertion.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub genre: String,
    pub summary: String,
    pub director: String,
    pub year: String,
    pub image: String,
}

/// Untrusted movie content as it arrives in a request body. Doubles as the
/// create payload (all fields required) and the update patch (all optional).
#[derive(Deserialize, Debug, Clone, Default)]
pub struct MovieDraft {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub summary: Option<String>,
    pub director: Option<String>,
    pub year: Option<String>,
    pub image: Option<String>,
}

fn is_blank(field: &Option<String>) -> bool {
    match field {
        None => true,
        Some(s) => s.trim().is_empty(),
    }
}

impl MovieDraft {
    /// Promotes the draft to a [`NewMovie`], or returns the names of ALL
    /// missing fields so the caller can report every one at once.
    pub fn into_new_movie(self) -> Result<NewMovie, Vec<&'static str>> {
        let mut empty_fields = Vec::new();
        if is_blank(&self.title) {
            empty_fields.push("title");
        }
        if is_blank(&self.genre) {
            empty_fields.push("genre");
        }
        if is_blank(&self.summary) {
            empty_fields.push("summary");
        }
        if is_blank(&self.director) {
            empty_fields.push("director");
        }
        if is_blank(&self.year) {
            empty_fields.push("year");
        }
        if is_blank(&self.image) {
            empty_fields.push("image");
        }
        if !empty_fields.is_empty() {
            return Err(empty_fields);
        }
        Ok(NewMovie {
            title: self.title.unwrap(),
            genre: self.genre.unwrap(),
            summary: self.summary.unwrap(),
            director: self.director.unwrap(),
            year: self.year.unwrap(),
            image: self.image.unwrap(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> MovieDraft {
        MovieDraft {
            title: Some("Stalker".to_string()),
            genre: Some("Sci-Fi".to_string()),
            summary: Some("A guide leads two men through the Zone.".to_string()),
            director: Some("Andrei Tarkovsky".to_string()),
            year: Some("1979".to_string()),
            image: Some("stalker.jpg".to_string()),
        }
    }

    #[test]
    fn complete_draft_promotes() {
        let movie = full_draft().into_new_movie().unwrap();
        assert_eq!(movie.title, "Stalker");
        assert_eq!(movie.year, "1979");
    }

    #[test]
    fn year_stays_text() {
        let draft: MovieDraft =
            serde_json::from_str(r#"{ "year": "2020" }"#).unwrap();
        assert_eq!(draft.year.as_deref(), Some("2020"));
    }

    #[test]
    fn missing_fields_are_all_collected() {
        let draft = MovieDraft {
            title: None,
            image: Some("   ".to_string()),
            ..full_draft()
        };
        let empty_fields = draft.into_new_movie().unwrap_err();
        assert_eq!(empty_fields, vec!["title", "image"]);
    }

    #[test]
    fn empty_draft_reports_every_field() {
        let empty_fields = MovieDraft::default().into_new_movie().unwrap_err();
        assert_eq!(
            empty_fields,
            vec!["title", "genre", "summary", "director", "year", "image"]
        );
    }

    #[test]
    fn blank_year_counts_as_missing() {
        let draft = MovieDraft {
            year: Some("  ".to_string()),
            ..full_draft()
        };
        let empty_fields = draft.into_new_movie().unwrap_err();
        assert_eq!(empty_fields, vec!["year"]);
    }
}
