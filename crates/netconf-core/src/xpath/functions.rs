//! XPath 1.0 core function library plus `current()`

use crate::errors::Result;
use crate::model::DataPath;
use crate::xpath::eval::{string_to_number, Context, Evaluator, Value};
use crate::xpath::parser::Expr;

pub(crate) fn call(ev: &Evaluator<'_>, name: &str, args: &[Expr], ctx: &Context) -> Result<Value> {
    let arity = |min: usize, max: usize| -> Result<()> {
        if args.len() < min || args.len() > max {
            return Err(ev.error(format!("wrong number of arguments to {}()", name)));
        }
        Ok(())
    };
    let arg = |i: usize| ev.eval(&args[i], ctx);
    // Optional string argument defaulting to the context node
    let string_or_context = |i: usize| -> Result<String> {
        match args.get(i) {
            Some(e) => {
                let v = ev.eval(e, ctx)?;
                ev.string(&v)
            }
            None => ev.view().string_value(&ctx.node),
        }
    };
    let string_arg = |i: usize| -> Result<String> { ev.string(&arg(i)?) };
    let number_arg = |i: usize| -> Result<f64> { ev.number(&arg(i)?) };

    match name {
        // Node-set functions
        "last" => {
            arity(0, 0)?;
            Ok(Value::Number(ctx.size as f64))
        }
        "position" => {
            arity(0, 0)?;
            Ok(Value::Number(ctx.position as f64))
        }
        "count" => {
            arity(1, 1)?;
            Ok(Value::Number(node_set(ev, name, arg(0)?)?.len() as f64))
        }
        "current" => {
            arity(0, 0)?;
            Ok(Value::Nodes(vec![ev.current().clone()]))
        }
        "id" => {
            arity(1, 1)?;
            Ok(Value::Nodes(Vec::new()))
        }
        "local-name" | "name" | "namespace-uri" => {
            arity(0, 1)?;
            let node = match args.first() {
                Some(_) => node_set(ev, name, arg(0)?)?.into_iter().next(),
                None => Some(ctx.node.clone()),
            };
            Ok(Value::Str(node.map(|n| node_name(ev, name, &n)).unwrap_or_default()))
        }

        // String functions
        "string" => {
            arity(0, 1)?;
            Ok(Value::Str(string_or_context(0)?))
        }
        "concat" => {
            if args.len() < 2 {
                return Err(ev.error("concat() needs at least two arguments"));
            }
            let mut out = String::new();
            for i in 0..args.len() {
                out.push_str(&string_arg(i)?);
            }
            Ok(Value::Str(out))
        }
        "starts-with" => {
            arity(2, 2)?;
            Ok(Value::Bool(string_arg(0)?.starts_with(&string_arg(1)?)))
        }
        "contains" => {
            arity(2, 2)?;
            Ok(Value::Bool(string_arg(0)?.contains(&string_arg(1)?)))
        }
        "substring-before" => {
            arity(2, 2)?;
            let (s, sep) = (string_arg(0)?, string_arg(1)?);
            Ok(Value::Str(
                s.split_once(sep.as_str())
                    .map(|(before, _)| before.to_string())
                    .unwrap_or_default(),
            ))
        }
        "substring-after" => {
            arity(2, 2)?;
            let (s, sep) = (string_arg(0)?, string_arg(1)?);
            Ok(Value::Str(
                s.split_once(sep.as_str())
                    .map(|(_, after)| after.to_string())
                    .unwrap_or_default(),
            ))
        }
        "substring" => {
            arity(2, 3)?;
            let s = string_arg(0)?;
            let start = number_arg(1)?;
            let length = match args.get(2) {
                Some(_) => Some(number_arg(2)?),
                None => None,
            };
            Ok(Value::Str(substring(&s, start, length)))
        }
        "string-length" => {
            arity(0, 1)?;
            Ok(Value::Number(string_or_context(0)?.chars().count() as f64))
        }
        "normalize-space" => {
            arity(0, 1)?;
            let s = string_or_context(0)?;
            Ok(Value::Str(s.split_whitespace().collect::<Vec<_>>().join(" ")))
        }
        "translate" => {
            arity(3, 3)?;
            let (s, from, to) = (string_arg(0)?, string_arg(1)?, string_arg(2)?);
            Ok(Value::Str(translate(&s, &from, &to)))
        }

        // Boolean functions
        "boolean" => {
            arity(1, 1)?;
            Ok(Value::Bool(ev.boolean(&arg(0)?)))
        }
        "not" => {
            arity(1, 1)?;
            Ok(Value::Bool(!ev.boolean(&arg(0)?)))
        }
        "true" => {
            arity(0, 0)?;
            Ok(Value::Bool(true))
        }
        "false" => {
            arity(0, 0)?;
            Ok(Value::Bool(false))
        }
        "lang" => {
            arity(1, 1)?;
            Ok(Value::Bool(false))
        }

        // Number functions
        "number" => {
            arity(0, 1)?;
            match args.first() {
                Some(_) => Ok(Value::Number(number_arg(0)?)),
                None => Ok(Value::Number(string_to_number(&string_or_context(0)?))),
            }
        }
        "sum" => {
            arity(1, 1)?;
            let mut total = 0.0;
            for n in node_set(ev, name, arg(0)?)? {
                total += string_to_number(&ev.view().string_value(&n)?);
            }
            Ok(Value::Number(total))
        }
        "floor" => {
            arity(1, 1)?;
            Ok(Value::Number(number_arg(0)?.floor()))
        }
        "ceiling" => {
            arity(1, 1)?;
            Ok(Value::Number(number_arg(0)?.ceil()))
        }
        "round" => {
            arity(1, 1)?;
            Ok(Value::Number(round(number_arg(0)?)))
        }
        other => Err(ev.error(format!("unknown function {}()", other))),
    }
}

fn node_set(ev: &Evaluator<'_>, function: &str, v: Value) -> Result<Vec<DataPath>> {
    match v {
        Value::Nodes(nodes) => Ok(nodes),
        _ => Err(ev.error(format!("{}() needs a node-set argument", function))),
    }
}

fn node_name(ev: &Evaluator<'_>, function: &str, node: &DataPath) -> String {
    let view = ev.view();
    let Some(r) = view.resolve(node) else {
        return String::new();
    };
    match function {
        "local-name" => r.node.name().to_string(),
        "namespace-uri" => r.node.namespace().to_string(),
        _ => {
            let schema = view.schema();
            if r.node.module() == schema.default_module().name {
                return r.node.name().to_string();
            }
            match schema.module(r.node.module()) {
                Some(m) => format!("{}:{}", m.prefix, r.node.name()),
                None => r.node.name().to_string(),
            }
        }
    }
}

/// XPath rounding: halves go towards positive infinity
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        return n;
    }
    let r = (n + 0.5).floor();
    if r == 0.0 && n < 0.0 {
        -0.0
    } else {
        r
    }
}

/// Characters at 1-based positions p with round(start) <= p < round(start) + round(len)
fn substring(s: &str, start: f64, length: Option<f64>) -> String {
    let first = round(start);
    let end = match length {
        Some(len) => first + round(len),
        None => f64::INFINITY,
    };
    if first.is_nan() || end.is_nan() {
        return String::new();
    }
    s.chars()
        .enumerate()
        .filter(|(i, _)| {
            let p = (*i + 1) as f64;
            p >= first && p < end
        })
        .map(|(_, c)| c)
        .collect()
}

fn translate(s: &str, from: &str, to: &str) -> String {
    let from: Vec<char> = from.chars().collect();
    let to: Vec<char> = to.chars().collect();
    s.chars()
        .filter_map(|c| match from.iter().position(|f| *f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect()
}
