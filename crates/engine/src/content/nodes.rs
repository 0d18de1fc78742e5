use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateNodeId,
    NoNodes,
}

#[derive(Debug, Clone)]
pub struct ContentError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentError {}

/// One `<Node>` as written in content. Kind and mission tokens stay raw
/// strings; the game decides what they mean.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDef {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub speaker: String,
    pub tag: String,
    pub x: f32,
    pub y: f32,
    pub mission: Option<String>,
}

pub fn load_node_defs(file_path: &Path) -> Result<Vec<NodeDef>, ContentError> {
    let raw = fs::read_to_string(file_path).map_err(|source| ContentError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read XML file: {source}"),
        file_path: file_path.to_path_buf(),
        location: None,
    })?;
    parse_node_defs(file_path, &raw)
}

pub fn parse_node_defs(file_path: &Path, raw: &str) -> Result<Vec<NodeDef>, ContentError> {
    let doc = Document::parse(raw).map_err(|error| ContentError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "WorldNodes" {
        return Err(error_at_node(
            ContentErrorCode::InvalidRoot,
            "root element must be <WorldNodes>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let mut seen_ids = HashSet::<String>::new();
    let mut defs = Vec::<NodeDef>::new();
    for child in root.children().filter(|node| node.is_element()) {
        if child.tag_name().name() != "Node" {
            return Err(error_at_node(
                ContentErrorCode::UnknownElement,
                format!(
                    "unsupported element <{}>; <WorldNodes> holds only <Node>",
                    child.tag_name().name()
                ),
                file_path,
                &doc,
                child,
            ));
        }
        let def = parse_node(file_path, &doc, child)?;
        if !seen_ids.insert(def.id.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateNodeId,
                format!("duplicate node id '{}'", def.id),
                file_path,
                &doc,
                child,
            ));
        }
        defs.push(def);
    }

    if defs.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::NoNodes,
            "<WorldNodes> must contain at least one <Node>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }
    Ok(defs)
}

fn parse_node(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<NodeDef, ContentError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut id: Option<String> = None;
    let mut kind: Option<String> = None;
    let mut name: Option<String> = None;
    let mut speaker: Option<String> = None;
    let mut tag: Option<String> = None;
    let mut x: Option<f32> = None;
    let mut y: Option<f32> = None;
    let mut mission: Option<String> = None;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        if !seen_fields.insert(field_name.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateField,
                format!("duplicate field <{}> in <Node>", field_name),
                file_path,
                doc,
                field,
            ));
        }

        match field_name.as_str() {
            "id" => id = Some(required_text(file_path, doc, field, "id")?),
            "kind" => kind = Some(required_text(file_path, doc, field, "kind")?),
            "name" => name = Some(required_text(file_path, doc, field, "name")?),
            "speaker" => speaker = Some(optional_text(field)),
            "tag" => tag = Some(optional_text(field)),
            "mission" => mission = Some(required_text(file_path, doc, field, "mission")?),
            "x" => x = Some(coordinate(file_path, doc, field, "x")?),
            "y" => y = Some(coordinate(file_path, doc, field, "y")?),
            _ => {
                return Err(error_at_node(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{}> in <Node>", field_name),
                    file_path,
                    doc,
                    field,
                ))
            }
        }
    }

    let missing = |field: &str| {
        error_at_node(
            ContentErrorCode::MissingField,
            format!("missing required field <{field}> in <Node>"),
            file_path,
            doc,
            node,
        )
    };
    let id = id.ok_or_else(|| missing("id"))?;
    let kind = kind.ok_or_else(|| missing("kind"))?;
    let name = name.ok_or_else(|| missing("name"))?;
    let x = x.ok_or_else(|| missing("x"))?;
    let y = y.ok_or_else(|| missing("y"))?;

    Ok(NodeDef {
        id,
        kind,
        name,
        speaker: speaker.unwrap_or_default(),
        tag: tag.unwrap_or_default(),
        x,
        y,
        mission,
    })
}

fn coordinate(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<f32, ContentError> {
    let value = required_text(file_path, doc, node, field_name)?;
    let parsed = value.parse::<f32>().map_err(|_| {
        error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{field_name} '{value}' is not a valid number"),
            file_path,
            doc,
            node,
        )
    })?;
    if !parsed.is_finite() {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{field_name} must be finite"),
            file_path,
            doc,
            node,
        ));
    }
    Ok(parsed)
}

fn optional_text(node: Node<'_, '_>) -> String {
    node.text().map(str::trim).unwrap_or_default().to_string()
}

fn required_text(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<String, ContentError> {
    let value = optional_text(node);
    if value.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::MissingField,
            format!("field <{}> must not be empty", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(value)
}

fn error_at_node(
    code: ContentErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> ContentError {
    let pos = doc.text_pos_at(node.range().start);
    ContentError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}
