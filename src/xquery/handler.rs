//! Single-pass evaluation of a set of queries.

use std::collections::HashMap;
use std::path::Path;

use roxmltree::{Document, Node};

use super::query::{Frame, XQuery};
use super::XQueryError;

/// Handle of a query registered on an [`XQueryHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(usize);

/// Evaluates all registered queries while walking a document once.
///
/// The walk is event driven: every element start pushes a frame onto a path
/// stack and offers it to each query, every element end pops it.
#[derive(Debug, Default)]
pub struct XQueryHandler {
    queries: Vec<XQuery>,
}

/// Values produced by one evaluation, indexed by [`QueryId`].
#[derive(Debug, Clone, Default)]
pub struct QueryResults {
    values: Vec<Vec<Option<String>>>,
}

impl XQueryHandler {
    pub fn new() -> Self {
        XQueryHandler {
            queries: Vec::new(),
        }
    }

    /// Compile and register a query.
    pub fn add_query(&mut self, expression: &str) -> Result<QueryId, XQueryError> {
        let query = XQuery::parse(expression)?;
        self.queries.push(query);
        Ok(QueryId(self.queries.len() - 1))
    }

    /// Evaluate all queries against an XML string.
    pub fn query_str(&self, xml: &str) -> Result<QueryResults, XQueryError> {
        self.evaluate(xml, "<string>")
    }

    /// Evaluate all queries against an XML file.
    pub fn query_file(&self, path: &Path) -> Result<QueryResults, XQueryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| XQueryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.evaluate(&contents, &path.display().to_string())
    }

    fn evaluate(&self, xml: &str, origin: &str) -> Result<QueryResults, XQueryError> {
        let doc = Document::parse(xml).map_err(|source| XQueryError::Xml {
            origin: origin.to_string(),
            source,
        })?;

        let mut results = QueryResults {
            values: vec![Vec::new(); self.queries.len()],
        };
        let mut stack = Vec::new();
        self.walk(doc.root_element(), 1, 1, &mut stack, &mut results);

        tracing::trace!("evaluated {} queries on {}", self.queries.len(), origin);
        Ok(results)
    }

    fn walk<'a>(
        &self,
        node: Node<'a, 'a>,
        position: usize,
        element_position: usize,
        stack: &mut Vec<Frame<'a>>,
        results: &mut QueryResults,
    ) {
        stack.push(Frame {
            name: node.tag_name().name(),
            attributes: node
                .attributes()
                .map(|a| (a.name(), a.value()))
                .collect(),
            position,
            element_position,
            text: element_text(node),
        });
        self.on_start_element(stack, results);

        let mut same_name: HashMap<&str, usize> = HashMap::new();
        for (index, child) in node.children().filter(|c| c.is_element()).enumerate() {
            let counter = same_name.entry(child.tag_name().name()).or_insert(0);
            *counter += 1;
            let child_position = *counter;
            self.walk(child, child_position, index + 1, stack, results);
        }

        stack.pop();
    }

    fn on_start_element(&self, stack: &[Frame<'_>], results: &mut QueryResults) {
        let Some(frame) = stack.last() else {
            return;
        };

        for (index, query) in self.queries.iter().enumerate() {
            if query.matches(stack) {
                results.values[index].push(query.select(frame));
            }
        }
    }
}

fn element_text(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect::<String>()
        .trim()
        .to_string()
}

impl QueryResults {
    /// All values of a query, one per matched element. Elements lacking a
    /// selected attribute contribute `None`.
    pub fn get(&self, id: QueryId) -> &[Option<String>] {
        self.values.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The present values of a query.
    pub fn values(&self, id: QueryId) -> impl Iterator<Item = &str> + '_ {
        self.get(id).iter().filter_map(|v| v.as_deref())
    }

    /// The first present value of a query.
    pub fn single(&self, id: QueryId) -> Option<&str> {
        self.values(id).next()
    }

    /// Number of elements matched by a query.
    pub fn count(&self, id: QueryId) -> usize {
        self.get(id).len()
    }
}
