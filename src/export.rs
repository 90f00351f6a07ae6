//! Controller scan → Postman collection.
//!
//! Each controller becomes a folder and each mapped handler an item. Request
//! bodies and response examples come from the mock synthesizer; controllers
//! are exported in parallel, every worker with its own synthesizer and memo.
use chrono::Local;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Settings;
use crate::java::{ClassEntry, MethodEntry, ParamEntry, SourceIndex};
use crate::mock::{scalar, SynthError, Synthesizer};
use crate::postman::{Body, Collection, Folder, Header, Item, QueryParam, Request, Response, Url, Variable};
use crate::types::TypeRef;

// ---- Policy ----

const CONTROLLER_ANNOTATIONS: &[&str] = &["RestController", "Controller"];

const SHORTCUT_MAPPINGS: &[(&str, &str)] = &[
    ("GetMapping", "GET"),
    ("PostMapping", "POST"),
    ("PutMapping", "PUT"),
    ("DeleteMapping", "DELETE"),
    ("PatchMapping", "PATCH"),
];

/// Handler parameters injected by the framework, never sent by a client.
const FRAMEWORK_PARAMS: &[&str] = &[
    "HttpServletRequest",
    "HttpServletResponse",
    "HttpSession",
    "ServletRequest",
    "ServletResponse",
    "ServerHttpRequest",
    "ServerHttpResponse",
    "ServerWebExchange",
    "WebRequest",
    "Model",
    "ModelMap",
    "BindingResult",
    "Errors",
    "Principal",
    "Authentication",
    "Locale",
    "MultipartFile",
];

/// `{id}` → `:id`
static PATH_VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}/]+)\}").expect("path variable regex"));

pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---- Errors ----

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no controller classes found in the given sources")]
    NoControllers,
    #[error("{controller}.{method}: {source}")]
    Synthesis { controller: String, method: String, source: SynthError },
    #[error("failed to render mock JSON: {0}")]
    Render(#[from] serde_json::Error),
}

// ---- Export ----

pub fn is_controller(entry: &ClassEntry) -> bool {
    CONTROLLER_ANNOTATIONS.iter().any(|a| entry.annotation(a).is_some())
}

pub fn export_collection(index: &SourceIndex, settings: &Settings) -> Result<Collection, ExportError> {
    let controllers: Vec<&ClassEntry> = index.entries().filter(|e| is_controller(e)).collect();
    let Some(first) = controllers.first() else {
        return Err(ExportError::NoControllers);
    };
    let name = first
        .doc
        .as_ref()
        .and_then(|d| d.tag("menu"))
        .filter(|menu| !menu.is_empty())
        .map_or_else(|| settings.export_name.clone(), str::to_string);

    let folders = controllers
        .par_iter()
        .map(|controller| export_controller(index, settings, controller))
        .collect::<Result<Vec<_>, _>>()?;

    let description = format!("exported at {}", Local::now().format(EXPORT_DATE_FORMAT));
    info!(collection = %name, folders = folders.len(), "exported collection");
    Ok(Collection::new(name, description, folders))
}

pub fn export_controller(index: &SourceIndex, settings: &Settings, controller: &ClassEntry) -> Result<Folder, ExportError> {
    let synth = Synthesizer::with_opaque_prefixes(index, settings.opaque_prefixes.clone());
    let base = controller.annotation("RequestMapping").map(mapping_path).unwrap_or_default();

    let mut items = Vec::new();
    for method in &controller.methods {
        let Some((verb, path)) = mapping(method) else { continue };
        let full_path = join_paths(&[&settings.context_path, &base, &path]);
        let item = HandlerExport { synth: &synth, settings, controller, method }
            .item(verb, &full_path)?;
        items.push(item);
    }

    let summary = controller.doc.as_ref().and_then(|d| d.summary.clone());
    info!(controller = %controller.decl.name, items = items.len(), "exported controller");
    Ok(Folder {
        name: summary.clone().unwrap_or_else(|| controller.simple_name().to_string()),
        description: summary,
        item: items,
    })
}

/// HTTP verb and method-level path of a handler, if it is one.
pub fn mapping(method: &MethodEntry) -> Option<(String, String)> {
    for (annotation, verb) in SHORTCUT_MAPPINGS {
        if let Some(found) = method.annotation(annotation) {
            return Some((verb.to_string(), mapping_path(found)));
        }
    }
    let found = method.annotation("RequestMapping")?;
    let verb = found.names("method").into_iter().next().unwrap_or_else(|| "GET".to_string());
    Some((verb, mapping_path(found)))
}

fn mapping_path(annotation: &crate::java::ast::Annotation) -> String {
    annotation
        .strings("value")
        .into_iter()
        .chain(annotation.strings("path"))
        .next()
        .unwrap_or_default()
}

/// Join path fragments with single slashes and Postman-style variables.
pub fn join_paths(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", PATH_VARIABLE.replace_all(&joined, ":$1"))
}

// ---- Handlers ----

struct HandlerExport<'a> {
    synth: &'a Synthesizer<'a, SourceIndex>,
    settings: &'a Settings,
    controller: &'a ClassEntry,
    method: &'a MethodEntry,
}

impl HandlerExport<'_> {
    fn item(&self, verb: String, path: &str) -> Result<Item, ExportError> {
        let mut header = Vec::new();
        let mut query = Vec::new();
        let mut variable = Vec::new();
        let mut body = None;

        for param in &self.method.params {
            if is_framework_param(&param.ty) {
                continue;
            }
            if param.annotation("RequestBody").is_some() {
                let value = self.mock(&param.ty)?;
                body = Some(Body::raw_json(serde_json::to_string_pretty(&value.to_json())?));
                header.push(Header::json_content_type());
            } else if let Some(found) = param.annotation("PathVariable") {
                let value = self.mock(&param.ty)?;
                variable.push(Variable { key: param_name(param, found), value: value.to_query_text() });
            } else if let Some(found) = param.annotation("RequestHeader") {
                let value = self.mock(&param.ty)?;
                header.push(Header::new(param_name(param, found), value.to_query_text()));
            } else if let Some(found) = param.annotation("RequestParam") {
                let value = self.mock(&param.ty)?;
                query.push(QueryParam { key: param_name(param, found), value: value.to_query_text() });
            } else {
                let value = self.mock(&param.ty)?;
                match value.as_object() {
                    // bound field by field, like a form object
                    Some(fields) if !is_scalar_type(&param.ty) => query.extend(
                        fields.iter().map(|(k, v)| QueryParam { key: k.clone(), value: v.to_query_text() }),
                    ),
                    _ => query.push(QueryParam { key: param.name.clone(), value: value.to_query_text() }),
                }
            }
        }

        let name = self
            .method
            .doc
            .as_ref()
            .and_then(|d| d.summary.clone())
            .unwrap_or_else(|| self.method.name.clone());
        let request = Request {
            method: verb,
            header,
            body,
            url: Url::new(&self.settings.base_url, path, query, variable),
            description: None,
        };

        let mut response = Vec::new();
        if let Some(returned) = response_type(&self.method.return_type) {
            let value = self.mock(returned)?;
            let example = serde_json::to_string_pretty(&value.to_json())?;
            response.push(Response::ok_json(name.clone(), request.clone(), example));
        }
        debug!(handler = %self.method.name, path, "exported handler");
        Ok(Item { name, request, response })
    }

    fn mock(&self, ty: &TypeRef) -> Result<std::rc::Rc<crate::mock::MockValue>, ExportError> {
        self.synth.mock(ty).map_err(|source| ExportError::Synthesis {
            controller: self.controller.decl.name.clone(),
            method: self.method.name.clone(),
            source,
        })
    }
}

fn param_name(param: &ParamEntry, annotation: &crate::java::ast::Annotation) -> String {
    annotation
        .strings("value")
        .into_iter()
        .chain(annotation.strings("name"))
        .find(|n| !n.is_empty())
        .unwrap_or_else(|| param.name.clone())
}

fn is_framework_param(ty: &TypeRef) -> bool {
    ty.simple_name().is_some_and(|name| FRAMEWORK_PARAMS.contains(&name))
}

fn is_scalar_type(ty: &TypeRef) -> bool {
    ty.is_primitive() || scalar::is_scalar(&ty.presentable_text())
}

/// The type worth an example response: `void` has none, `ResponseEntity<T>` is `T`.
fn response_type(returned: &TypeRef) -> Option<&TypeRef> {
    match returned {
        TypeRef::Void => None,
        TypeRef::Class { args, .. } if returned.simple_name() == Some("ResponseEntity") => match args.as_slice() {
            [inner] if !inner.is_void() && inner.class_name() != Some("java.lang.Void") => Some(inner),
            _ => None,
        },
        other => Some(other),
    }
}
