/// A predefined topic category. Themes are not persisted; a topic stores the
/// ids of its themes in its comma-joined tag list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub label: &'static str,
}

pub const THEMES: &[Theme] = &[
    Theme { id: "technologie", label: "Technologie" },
    Theme { id: "sport", label: "Sport" },
    Theme { id: "musique", label: "Musique" },
    Theme { id: "cinema", label: "Cinéma" },
    Theme { id: "litterature", label: "Littérature" },
    Theme { id: "cuisine", label: "Cuisine" },
    Theme { id: "voyage", label: "Voyage" },
    Theme { id: "science", label: "Science" },
    Theme { id: "art", label: "Art" },
    Theme { id: "jeux", label: "Jeux" },
    Theme { id: "mode", label: "Mode" },
    Theme { id: "sante", label: "Santé" },
    Theme { id: "education", label: "Éducation" },
    Theme { id: "politique", label: "Politique" },
    Theme { id: "economie", label: "Économie" },
    Theme { id: "environnement", label: "Environnement" },
    Theme { id: "histoire", label: "Histoire" },
    Theme { id: "philosophie", label: "Philosophie" },
    Theme { id: "psychologie", label: "Psychologie" },
    Theme { id: "societe", label: "Société" },
];

pub fn find(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

/// Display labels for a stored tag list. Unknown entries are shown verbatim.
pub fn labels(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| find(t).map(|th| th.label.to_owned()).unwrap_or_else(|| t.to_owned()))
        .collect()
}
