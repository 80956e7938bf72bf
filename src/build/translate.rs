//! Text-level rewrites of compiled and source modules.
//!
//! Rewrites are anchored regexes rather than exact string matches, so they
//! tolerate either quote style and incidental whitespace. They still operate
//! on text, not on a parsed module.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

use crate::adapter::HandlerStyle;

static DEFAULT_EXPORT_JS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*exports\.default[ \t]*=[ \t]*([A-Za-z_$][\w$]*)[ \t]*;?[ \t]*\r?\n?")
        .expect("valid default export regex")
});

static DEFAULT_EXPORT_TS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*export[ \t]+default\b").expect("valid export regex"));

static EXPORTED_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bexport[ \t]+const[ \t]+handler\b").expect("valid handler export regex")
});

static LAYER_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"from[ \t]*(["'])\.\./\.\./layers"#).expect("valid layer import regex")
});

/// Name the Lambda wrapper calls when no default export name can be found.
pub const DEFAULT_TRIGGER: &str = "httpTrigger";

/// Calling convention of a TypeScript source module: a default export is a
/// context-style trigger, anything else is treated as a Lambda handler.
#[must_use]
pub fn detect_style(source: &str) -> HandlerStyle {
    if DEFAULT_EXPORT_TS.is_match(source) {
        HandlerStyle::Context
    } else {
        HandlerStyle::Lambda
    }
}

/// Rewrites every `require("<from>` prefix to `require("<to>`. Each require
/// is rewritten at most once, by the longest matching `from`.
#[must_use]
pub fn rewrite_requires(content: &str, import_paths: &BTreeMap<String, String>) -> String {
    let mut sources: Vec<&str> = import_paths
        .keys()
        .map(String::as_str)
        .filter(|from| !from.is_empty())
        .collect();
    if sources.is_empty() {
        return content.to_string();
    }
    sources.sort_by(|a, b| b.len().cmp(&a.len()));
    let alternation = sources
        .iter()
        .map(|from| regex::escape(from))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(re) = Regex::new(&format!(r#"require\([ \t]*(["'])({alternation})"#)) else {
        return content.to_string();
    };
    re.replace_all(content, |caps: &Captures| {
        let to = import_paths
            .get(&caps[2])
            .map_or(&caps[2], String::as_str);
        format!("require({}{}", &caps[1], to)
    })
    .into_owned()
}

/// Turns a compiled context-style module into a Lambda module: drops the
/// `exports.default = <trigger>;` line and appends a `handler` export that
/// drives the trigger with a synthesized context.
#[must_use]
pub fn to_lambda_module(content: &str) -> String {
    let trigger = DEFAULT_EXPORT_JS
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map_or(DEFAULT_TRIGGER, |m| m.as_str())
        .to_string();
    let stripped = DEFAULT_EXPORT_JS.replace_all(content, "");
    format!("{}{}", stripped, lambda_wrapper(&trigger))
}

/// Prepares a Lambda-style TypeScript source for the Azure project: adds the
/// `@azure/functions` import and an `httpTrigger` default export wrapping
/// `handler`.
#[must_use]
pub fn to_azure_source(content: &str) -> String {
    format!("{AZURE_IMPORT}{content}{AZURE_WRAPPER}")
}

/// Fixes layer import depth and un-exports `handler` for a source copied one
/// level up into the Azure project.
#[must_use]
pub fn relocate_for_azure(content: &str) -> String {
    let relocated = LAYER_IMPORT.replace_all(content, "from ${1}../layers");
    EXPORTED_HANDLER
        .replace_all(&relocated, "const handler")
        .into_owned()
}

fn lambda_wrapper(trigger: &str) -> String {
    format!(
        r#"
const handler = async (event) => {{
  const context = {{
    log: (msg) => console.log(`[${{new Date().toISOString()}}] ${{msg}}`),
    res: {{
      status: 200,
      body: "",
    }},
  }};
  let body = null;
  if (event.body) {{
    const raw = event.isBase64Encoded
      ? Buffer.from(event.body, "base64").toString("utf8")
      : event.body;
    try {{
      body = JSON.parse(raw);
    }} catch (_) {{
      body = raw;
    }}
  }}
  const req = {{
    url: event.path,
    method: event.httpMethod,
    headers: event.headers || {{}},
    query: event.queryStringParameters || {{}},
    params: event.pathParameters || {{}},
    body,
  }};
  await {trigger}(context, req);
  const {{ status, body: resBody, headers }} = context.res;
  return {{
    statusCode: status || 200,
    headers,
    body: typeof resBody == "object" ? JSON.stringify(resBody) : resBody,
  }};
}};

exports.handler = handler;
"#
    )
}

const AZURE_IMPORT: &str = "import { AzureFunction, Context, HttpRequest } from \"@azure/functions\";\n";

const AZURE_WRAPPER: &str = r#"
const httpTrigger: AzureFunction = async function (
  context: Context,
  req: HttpRequest
): Promise<void> {
  context.log("HTTP trigger function processed a request.");
  const event: any = {
    path: req.url,
    httpMethod: req.method,
    headers: req.headers,
    queryStringParameters: req.query,
    pathParameters: req.params,
    body: req.body === undefined ? null : JSON.stringify(req.body),
  };
  const lambdaResponse: APIGatewayProxyResult = await handler(event);
  let body: any = lambdaResponse.body;
  try {
    body = JSON.parse(lambdaResponse.body);
  } catch (_) {}
  context.res = {
    status: lambdaResponse.statusCode,
    body,
    headers: lambdaResponse.headers,
  };
};

export default httpTrigger;"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_detect_style() {
        let context = "const httpTrigger = async function (context, req) {};\nexport default httpTrigger;";
        let lambda = "export const handler = async (event) => ({ statusCode: 200, body: \"\" });";
        assert_eq!(detect_style(context), HandlerStyle::Context);
        assert_eq!(detect_style(lambda), HandlerStyle::Lambda);
    }

    #[test]
    fn test_rewrite_requires_applies_every_mapping() {
        let js = r#"const common_1 = require("../../layers/common");
const db_1 = require('../../layers/db/client');
const fs = require("fs");"#;
        let rewritten = rewrite_requires(
            js,
            &mappings(&[
                ("../../layers/common", "/opt/nodejs/common"),
                ("../../layers/db", "/opt/nodejs/db"),
            ]),
        );
        assert!(rewritten.contains(r#"require("/opt/nodejs/common")"#));
        assert!(rewritten.contains("require('/opt/nodejs/db/client')"));
        assert!(rewritten.contains(r#"require("fs")"#));
    }

    #[test]
    fn test_rewrite_requires_escapes_mapping_keys() {
        let js = r#"require("a.b/x"); require("aXb/x");"#;
        let rewritten = rewrite_requires(js, &mappings(&[("a.b", "c")]));
        assert_eq!(rewritten, r#"require("c/x"); require("aXb/x");"#);
    }

    #[test]
    fn test_rewritten_require_is_not_rewritten_again() {
        let js = r#"require("a/y"); require('b/z');"#;
        let rewritten = rewrite_requires(js, &mappings(&[("a", "b/x"), ("b", "c")]));
        assert_eq!(rewritten, r#"require("b/x/y"); require('c/z');"#);
    }

    #[test]
    fn test_longest_mapping_wins() {
        let js = r#"require("../layers/db/client");"#;
        let rewritten = rewrite_requires(
            js,
            &mappings(&[("../layers", "/opt/nodejs"), ("../layers/db", "/opt/db")]),
        );
        assert_eq!(rewritten, r#"require("/opt/db/client");"#);
    }

    #[test]
    fn test_to_lambda_module() {
        let js = "\"use strict\";\nconst trigger = async function (context, req) {\n  context.res = { body: { ok: true } };\n};\nexports.default = trigger;\n";
        let translated = to_lambda_module(js);
        assert!(!translated.contains("exports.default"));
        assert!(translated.contains("await trigger(context, req);"));
        assert!(translated.contains("statusCode: status || 200"));
        assert!(translated.trim_end().ends_with("exports.handler = handler;"));
    }

    #[test]
    fn test_to_lambda_module_defaults_trigger_name() {
        let translated = to_lambda_module("function x() {}\n");
        assert!(translated.contains("await httpTrigger(context, req);"));
    }

    #[test]
    fn test_azure_source_rewrites() {
        let ts = "import { hello } from \"../../layers/common\";\nexport const handler = async (event) => ({ statusCode: 200, body: hello() });\n";
        let source = relocate_for_azure(&to_azure_source(ts));
        assert!(source.starts_with("import { AzureFunction, Context, HttpRequest } from \"@azure/functions\";\n"));
        assert!(source.contains("from \"../layers/common\""));
        assert!(source.contains("\nconst handler = async"));
        assert!(!source.contains("export const handler"));
        assert!(source.ends_with("export default httpTrigger;"));
    }

    #[test]
    fn test_relocate_leaves_context_source_exports() {
        let ts = "import { hello } from '../../layers/common';\nexport default httpTrigger;";
        let source = relocate_for_azure(ts);
        assert_eq!(
            source,
            "import { hello } from '../layers/common';\nexport default httpTrigger;"
        );
    }
}
