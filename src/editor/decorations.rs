use crate::checker::Misspelling;

/// Style class attached to misspelled-word markers.
pub const MISSPELLING_CLASS: &str = "squiggly-misspelling";

/// A renderer-neutral editor marker: range, hover message, style class and
/// an overview-ruler/minimap mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub start: usize,
    pub end: usize,
    pub word: String,
    pub hover_message: String,
    pub class: &'static str,
    pub minimap_mark: bool,
}

/// One-to-one transform from misspelled ranges to decorations. No judgment
/// logic lives here.
pub fn render(misspellings: &[Misspelling]) -> Vec<Decoration> {
    misspellings
        .iter()
        .map(|m| Decoration {
            start: m.start,
            end: m.end,
            word: m.word.clone(),
            hover_message: format!("\"{}\" may be misspelled", m.word),
            class: MISSPELLING_CLASS,
            minimap_mark: true,
        })
        .collect()
}

/// The currently displayed decoration batch. Each check pass swaps the
/// whole set; nothing is patched incrementally.
#[derive(Debug, Default)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn replace_all(&mut self, decorations: Vec<Decoration>) {
        self.decorations = decorations;
    }

    pub fn clear(&mut self) {
        self.decorations.clear();
    }

    pub fn all(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_one_to_one() {
        let misspellings = vec![
            Misspelling {
                word: "qick".to_string(),
                start: 15,
                end: 19,
            },
            Misspelling {
                word: "teh".to_string(),
                start: 30,
                end: 33,
            },
        ];

        let decorations = render(&misspellings);
        assert_eq!(decorations.len(), 2);
        assert_eq!(decorations[0].start, 15);
        assert_eq!(decorations[0].hover_message, "\"qick\" may be misspelled");
        assert_eq!(decorations[0].class, MISSPELLING_CLASS);
        assert!(decorations[1].minimap_mark);
    }

    #[test]
    fn test_replace_all_swaps_batch() {
        let mut set = DecorationSet::default();
        set.replace_all(render(&[Misspelling {
            word: "qick".to_string(),
            start: 0,
            end: 4,
        }]));
        assert_eq!(set.len(), 1);

        set.replace_all(Vec::new());
        assert!(set.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut set = DecorationSet::default();
        set.replace_all(render(&[Misspelling {
            word: "x".to_string(),
            start: 0,
            end: 1,
        }]));
        set.clear();
        assert!(set.is_empty());
    }
}
