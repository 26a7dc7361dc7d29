use crate::shell::ast::{Child, Node, NodeKind, Token, TokenKind};
use crate::shell::commands::ArgPolicy;
use crate::shell::context::ShellContext;
use crate::shell::env::Environment;
use crate::shell::error::ShellError;
use crate::shell::expand::expand_iterable;
use crate::shell::parser::parse_program;
use crate::shell::value::{Outcome, Value};
use anyhow::Result;
use log::debug;

// Stops "!N" from replaying itself forever.
const MAX_RECALL_DEPTH: usize = 32;

/// Parses and runs `src`; the result is that of the last top-level instruction.
/// An empty program succeeds.
pub fn run_program(src: &str, ctx: &mut ShellContext) -> Result<Outcome> {
    let nodes = parse_program(src)?;
    let mut result = Outcome::success();
    for node in &nodes {
        result = execute_node(node, ctx)?;
    }
    Ok(result)
}

pub fn execute_node(node: &Node, ctx: &mut ShellContext) -> Result<Outcome> {
    match node.kind {
        NodeKind::Command => execute_command(node, ctx),
        NodeKind::Exec => {
            let target = node
                .children
                .get(1)
                .and_then(Child::as_token)
                .ok_or_else(|| ShellError::malformed(node.kind, "missing history reference"))?;
            let index = history_index(&target.text, ctx)?;
            recall(index, ctx)
        }
        NodeKind::RepeatHist => {
            // The newest slot is this "!!" itself; replay the one before it.
            let len = ctx.history.len();
            if len < 2 {
                return Err(ShellError::NoHistoryAvailable.into());
            }
            recall(len - 1, ctx)
        }
        NodeKind::For => execute_for(node, ctx),
        NodeKind::CodeBlock => {
            let mut result = Outcome::success();
            for child in node.children.iter().filter(|c| !c.is_newline()) {
                result = execute_child(child, ctx)?;
            }
            Ok(result)
        }
    }
}

fn execute_child(child: &Child, ctx: &mut ShellContext) -> Result<Outcome> {
    match child {
        Child::Node(node) => execute_node(node, ctx),
        Child::Token(token) => Err(ShellError::UnknownInstruction(token.kind.to_string()).into()),
    }
}

fn token_values(kind: NodeKind, children: &[Child]) -> Result<Vec<Value>> {
    children
        .iter()
        .map(|child| -> Result<Value> {
            match child {
                Child::Token(token) => Value::from_token(token)
                    .ok_or_else(|| ShellError::malformed(kind, format!("unexpected {} token", token.kind)).into()),
                Child::Node(inner) => Err(ShellError::malformed(kind, format!("nested {} instruction", inner.kind)).into()),
            }
        })
        .collect()
}

fn execute_command(node: &Node, ctx: &mut ShellContext) -> Result<Outcome> {
    let head = node
        .children
        .first()
        .and_then(Child::as_token)
        .ok_or_else(|| ShellError::malformed(node.kind, "missing command name"))?;

    let is_assignment = head.kind == TokenKind::Variable
        && matches!(node.children.get(1), Some(Child::Token(Token { kind: TokenKind::Equals, .. })));
    if is_assignment {
        // Skip the "=" marker
        let values = token_values(node.kind, &node.children[2..])?;
        assign(ctx, &head.text, values)?;
        return Ok(Outcome::success());
    }

    let args = token_values(node.kind, &node.children[1..])?;
    dispatch(&head.text, args, ctx)
}

/// Looks up `name` in the command table, resolves `args` by the command's
/// policy and calls it.
pub fn dispatch(name: &str, args: Vec<Value>, ctx: &mut ShellContext) -> Result<Outcome> {
    let registry = ctx.registry.clone();
    let Some(cmd) = registry.get(name) else {
        return Err(ShellError::UnknownCommand(name.to_string()).into());
    };

    let too_few = args.len() < cmd.min_args();
    let too_many = cmd.max_args().is_some_and(|max| args.len() > max);
    if too_few || too_many {
        debug!("'{}' called with {} argument(s)", name, args.len());
        return Err(ShellError::UnknownCommand(name.to_string()).into());
    }

    let resolved = args
        .iter()
        .map(|arg| resolve_arg(arg, cmd.arg_policy(), &ctx.vars))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Dispatching '{}' with {:?}", name, resolved);
    cmd.execute(&resolved, ctx)
}

fn resolve_arg(arg: &Value, policy: ArgPolicy, vars: &Environment) -> Result<Value, ShellError> {
    match (vars.resolve(arg), policy) {
        (Err(ShellError::UndefinedVariable(name)), ArgPolicy::Lenient) => Ok(Value::name(name)),
        (result, _) => result,
    }
}

/// Binds `name`. A single value is stored after one level of resolution;
/// several values are run as a command and its outcome is stored.
pub fn assign(ctx: &mut ShellContext, name: &str, mut values: Vec<Value>) -> Result<()> {
    let value = match values.len() {
        0 => return Err(ShellError::malformed(NodeKind::Command, format!("nothing to assign to {}", name)).into()),
        1 => {
            let value = values.remove(0);
            ctx.vars.resolve(&value)?.into_bound()
        }
        _ => {
            let args = values.split_off(1);
            let command = match &values[0] {
                Value::VariableRef(cmd) => cmd.clone(),
                other => match other.as_text() {
                    Some(text) => text.to_string(),
                    None => return Err(ShellError::UnknownCommand(other.to_string()).into()),
                },
            };
            let outcome = dispatch(&command, args, ctx)?;
            Value::CommandResult(Box::new(outcome))
        }
    };
    debug!("{} = {:?}", name, value);
    ctx.vars.store(name, value);
    Ok(())
}

fn history_index(target: &str, ctx: &ShellContext) -> Result<usize> {
    if let Ok(index) = target.parse::<usize>() {
        return Ok(index);
    }
    // "!prefix": newest entry before the in-progress one that starts with it
    let upto = ctx.history.len().saturating_sub(1);
    ctx.history
        .find_latest(target, upto)
        .ok_or_else(|| ShellError::HistoryEntryMissing(target.to_string()).into())
}

fn recall(index: usize, ctx: &mut ShellContext) -> Result<Outcome> {
    let Some(text) = ctx.history.get(index) else {
        return Err(ShellError::HistoryEntryMissing(index.to_string()).into());
    };
    if ctx.recall_depth >= MAX_RECALL_DEPTH {
        return Err(ShellError::HistoryEntryMissing(index.to_string()).into());
    }

    // Overwrite the newest slot so the replay is logged as what actually ran.
    let latest = ctx.history.len();
    ctx.history.replace(latest, &text);
    debug!("Recalling history entry {}: {}", index, text);

    ctx.recall_depth += 1;
    let result = run_program(&text, ctx);
    ctx.recall_depth -= 1;
    result
}

fn execute_for(node: &Node, ctx: &mut ShellContext) -> Result<Outcome> {
    let args: Vec<&Child> = node.children.iter().filter(|c| !c.is_newline()).collect();
    let [_, var, _, source, body] = args.as_slice() else {
        return Err(ShellError::malformed(node.kind, format!("expected 5 parts, found {}", args.len())).into());
    };
    let var = var
        .as_token()
        .filter(|t| t.kind == TokenKind::Variable)
        .ok_or_else(|| ShellError::malformed(node.kind, "missing loop variable"))?;
    let source = source
        .as_token()
        .ok_or_else(|| ShellError::malformed(node.kind, "missing loop source"))?;
    let Child::Node(body) = body else {
        return Err(ShellError::malformed(node.kind, "missing loop body").into());
    };

    let items = expand_iterable(source, &ctx.vars, &ctx.cwd)?;
    debug!("for {} in {}: {} item(s)", var.text, source.text, items.len());

    // An empty sequence succeeds without running the body.
    let mut result = Outcome::success();
    for item in items {
        let value = loop_value(item, &ctx.vars)?;
        ctx.vars.store(&var.text, value);
        result = execute_node(body, ctx)?;
        if !result.is_truthy() {
            debug!("for {}: body failed, stopping", var.text);
            break;
        }
    }
    Ok(result)
}

/// Bare list elements are resolved when bound; a name with no variable
/// behind it stands for itself, as in `for i in [1, 2, 3]`.
fn loop_value(item: Value, vars: &Environment) -> Result<Value, ShellError> {
    match vars.resolve(&item) {
        Err(ShellError::UndefinedVariable(name)) => Ok(Value::name(name)),
        other => other.map(Value::into_bound),
    }
}
