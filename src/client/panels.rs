use crate::client::{ApiClient, ApiResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// One bibliography entry from the citations endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Citation {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub journal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Figure {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableAsset {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// A node of the project file tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileNode {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub children: Vec<FileNode>,
}

/// Behavior a panel needs from its items: a search haystack and the LaTeX
/// snippet inserted into the document on drop.
pub trait PanelItem {
    fn haystack(&self) -> String;
    fn snippet(&self) -> String;
}

impl PanelItem for Citation {
    fn haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.key,
            self.title,
            self.authors,
            self.journal.as_deref().unwrap_or("")
        )
    }

    fn snippet(&self) -> String {
        format!("\\cite{{{}}}", self.key)
    }
}

impl PanelItem for Figure {
    fn haystack(&self) -> String {
        format!(
            "{} {}",
            self.name,
            self.caption.as_deref().unwrap_or("")
        )
    }

    fn snippet(&self) -> String {
        let mut snippet = String::from("\\begin{figure}[htbp]\n    \\centering\n");
        snippet.push_str(&format!("    \\includegraphics[width=\\linewidth]{{{}}}\n", self.path));
        if let Some(caption) = &self.caption {
            snippet.push_str(&format!("    \\caption{{{}}}\n", caption));
        }
        if let Some(label) = &self.label {
            snippet.push_str(&format!("    \\label{{{}}}\n", label));
        }
        snippet.push_str("\\end{figure}\n");
        snippet
    }
}

impl PanelItem for TableAsset {
    fn haystack(&self) -> String {
        format!(
            "{} {}",
            self.name,
            self.caption.as_deref().unwrap_or("")
        )
    }

    fn snippet(&self) -> String {
        let mut snippet = String::from("\\begin{table}[htbp]\n    \\centering\n");
        if let Some(caption) = &self.caption {
            snippet.push_str(&format!("    \\caption{{{}}}\n", caption));
        }
        if let Some(label) = &self.label {
            snippet.push_str(&format!("    \\label{{{}}}\n", label));
        }
        snippet.push_str(&format!("    \\input{{{}}}\n\\end{{table}}\n", self.path));
        snippet
    }
}

/// Search/sort/selection state over one side panel's items.
#[derive(Debug)]
pub struct Panel<T> {
    items: Vec<T>,
    query: String,
    selected: Option<usize>,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            query: String::new(),
            selected: None,
        }
    }
}

impl<T: PanelItem> Panel<T> {
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = None;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Items matching the query, case-insensitively, with their indices
    /// into the full item list.
    pub fn visible(&self) -> Vec<(usize, &T)> {
        let needle = self.query.to_lowercase();
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.haystack().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// The LaTeX snippet for the selected item; what a drop into the
    /// editor inserts.
    pub fn insertion_snippet(&self) -> Option<String> {
        self.selected().map(PanelItem::snippet)
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        // Selection refers to positions, which a sort invalidates.
        self.selected = None;
        self.items.sort_by(compare);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationSort {
    Key,
    YearDesc,
    Title,
}

impl Panel<Citation> {
    pub fn sort(&mut self, order: CitationSort) {
        match order {
            CitationSort::Key => self.sort_by(|a, b| a.key.cmp(&b.key)),
            CitationSort::YearDesc => {
                self.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.key.cmp(&b.key)))
            }
            CitationSort::Title => self.sort_by(|a, b| a.title.cmp(&b.title)),
        }
    }
}

impl ApiClient {
    pub fn fetch_citations(&self) -> ApiResult<Vec<Citation>> {
        self.fetch_list("citations/", "citations")
    }

    pub fn fetch_figures(&self) -> ApiResult<Vec<Figure>> {
        self.fetch_list("figures/", "figures")
    }

    pub fn fetch_tables(&self) -> ApiResult<Vec<TableAsset>> {
        self.fetch_list("tables/", "tables")
    }

    pub fn fetch_file_tree(&self) -> ApiResult<Vec<FileNode>> {
        self.fetch_list("file-tree/", "files")
    }

    /// List endpoints answer either a bare array or `{key: [...]}`.
    /// Anything else is logged and treated as an empty list.
    fn fetch_list<T: DeserializeOwned>(&self, tail: &str, key: &str) -> ApiResult<Vec<T>> {
        let body: Value = self
            .http()
            .get(self.url(tail))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(parse_list(&body, key, tail))
    }
}

fn parse_list<T: DeserializeOwned>(body: &Value, key: &str, endpoint: &str) -> Vec<T> {
    let array = if body.is_array() {
        body.clone()
    } else if let Some(nested) = body.get(key).filter(|v| v.is_array()) {
        nested.clone()
    } else {
        eprintln!("Warning: unexpected {} response shape, treating as empty", endpoint);
        return Vec::new();
    };

    match serde_json::from_value(array) {
        Ok(items) => items,
        Err(err) => {
            eprintln!("Warning: failed to decode {} response: {}", endpoint, err);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn citations() -> Vec<Citation> {
        vec![
            Citation {
                key: "smith2020".to_string(),
                title: "Neural flux dynamics".to_string(),
                authors: "Smith, J.".to_string(),
                year: Some(2020),
                journal: Some("J. Flux".to_string()),
            },
            Citation {
                key: "doe2023".to_string(),
                title: "Manuscript tooling".to_string(),
                authors: "Doe, A.".to_string(),
                year: Some(2023),
                journal: None,
            },
        ]
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut panel = Panel::default();
        panel.set_items(citations());

        panel.set_query("FLUX");
        let visible = panel.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].1.key, "smith2020");

        panel.set_query("");
        assert_eq!(panel.visible().len(), 2);
    }

    #[test]
    fn test_selection_and_snippet() {
        let mut panel = Panel::default();
        panel.set_items(citations());

        assert!(panel.select(1));
        assert_eq!(panel.insertion_snippet().as_deref(), Some("\\cite{doe2023}"));
        assert!(!panel.select(9));
    }

    #[test]
    fn test_sort_year_desc_resets_selection() {
        let mut panel = Panel::default();
        panel.set_items(citations());
        panel.select(0);

        panel.sort(CitationSort::YearDesc);
        assert!(panel.selected().is_none());
        assert_eq!(panel.items()[0].key, "doe2023");
    }

    #[test]
    fn test_figure_snippet_structure() {
        let figure = Figure {
            name: "fig1".to_string(),
            path: "figs/fig1.pdf".to_string(),
            caption: Some("Flux over time".to_string()),
            label: Some("fig:flux".to_string()),
        };
        let snippet = figure.snippet();
        assert!(snippet.starts_with("\\begin{figure}"));
        assert!(snippet.contains("\\includegraphics[width=\\linewidth]{figs/fig1.pdf}"));
        assert!(snippet.contains("\\caption{Flux over time}"));
        assert!(snippet.contains("\\label{fig:flux}"));
        assert!(snippet.ends_with("\\end{figure}\n"));
    }

    #[test]
    fn test_table_snippet_inputs_path() {
        let table = TableAsset {
            name: "results".to_string(),
            path: "tables/results.tex".to_string(),
            caption: None,
            label: None,
        };
        let snippet = table.snippet();
        assert!(snippet.contains("\\input{tables/results.tex}"));
    }

    #[test]
    fn test_parse_list_accepts_both_shapes() {
        let bare = json!([{"key": "a1"}]);
        let wrapped = json!({"citations": [{"key": "a1"}]});
        let bad = json!({"unrelated": 3});

        let from_bare: Vec<Citation> = parse_list(&bare, "citations", "citations/");
        let from_wrapped: Vec<Citation> = parse_list(&wrapped, "citations", "citations/");
        let from_bad: Vec<Citation> = parse_list(&bad, "citations", "citations/");

        assert_eq!(from_bare.len(), 1);
        assert_eq!(from_wrapped.len(), 1);
        assert!(from_bad.is_empty());
    }

    #[test]
    fn test_file_tree_deserializes_recursively() {
        let node: FileNode = serde_json::from_value(json!({
            "name": "figs",
            "path": "figs",
            "is_dir": true,
            "children": [{"name": "fig1.pdf", "path": "figs/fig1.pdf"}],
        }))
        .unwrap();
        assert!(node.is_dir);
        assert_eq!(node.children.len(), 1);
        assert!(!node.children[0].is_dir);
    }
}
