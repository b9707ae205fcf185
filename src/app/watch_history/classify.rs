use super::{Category, HistoryEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Classified {
    pub(crate) category: Category,
    pub(crate) label: String,
}

impl Category {
    pub(crate) fn from_item_type(item_type: &str) -> Self {
        if item_type.eq_ignore_ascii_case("episode") {
            Self::Episode
        } else if item_type.eq_ignore_ascii_case("movie") {
            Self::Movie
        } else {
            Self::Other
        }
    }
}

pub(crate) fn classify(entry: &HistoryEntry) -> Classified {
    let category = Category::from_item_type(&entry.item_type);
    let label = match category {
        Category::Episode => format!(
            "📺 EPISODE: {} (Show: {}, Season: {})",
            entry.title,
            entry.grandparent_title.as_deref().unwrap_or_default(),
            entry.parent_title.as_deref().unwrap_or_default(),
        ),
        Category::Movie => format!("🎥 MOVIE: {}", entry.title),
        Category::Other => format!("📄 OTHER: {}", entry.title),
    };
    Classified { category, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(item_type: &str, parent: Option<&str>, grandparent: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            id: "id-1".to_string(),
            item_type: item_type.to_string(),
            title: "Title".to_string(),
            parent_title: parent.map(str::to_string),
            grandparent_title: grandparent.map(str::to_string),
        }
    }

    #[test]
    fn episode_matching_ignores_case_and_embeds_show_and_season() {
        for item_type in ["episode", "Episode", "EPISODE", "ePiSoDe"] {
            let classified = classify(&entry(item_type, Some("Season 2"), Some("The Show")));
            assert_eq!(classified.category, Category::Episode, "type {item_type}");
            assert_eq!(
                classified.label,
                "📺 EPISODE: Title (Show: The Show, Season: Season 2)"
            );
        }
    }

    #[test]
    fn episode_without_context_falls_back_to_empty_strings() {
        let classified = classify(&entry("episode", None, None));
        assert_eq!(classified.label, "📺 EPISODE: Title (Show: , Season: )");
    }

    #[test]
    fn movie_label_has_title_only() {
        let classified = classify(&entry("MOVIE", Some("ignored"), Some("ignored")));
        assert_eq!(classified.category, Category::Movie);
        assert_eq!(classified.label, "🎥 MOVIE: Title");
    }

    #[test]
    fn unknown_types_are_other() {
        for item_type in ["track", "Unknown", "", "episodes"] {
            let classified = classify(&entry(item_type, None, None));
            assert_eq!(classified.category, Category::Other, "type {item_type:?}");
            assert_eq!(classified.label, "📄 OTHER: Title");
        }
    }

    #[test]
    fn surrounding_whitespace_is_not_ignored() {
        for item_type in [" episode", "episode ", "\tmovie", "movie\n"] {
            let classified = classify(&entry(item_type, Some("S1"), Some("Show")));
            assert_eq!(classified.category, Category::Other, "type {item_type:?}");
        }
    }
}
