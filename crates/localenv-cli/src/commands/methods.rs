//! String-argument method surface over the store.
//!
//! Every store call from the command line goes through [`dispatch`], which
//! checks arity and names before forwarding to [`LocalStore`].

use std::collections::BTreeMap;

use localenv_store::{EnvValue, LocalStore, REDACTED};

use crate::error::CommandError;

/// Method names and their usage lines.
pub const METHODS: &[(&str, &str)] = &[
    ("set", "<name> <value> - set environment variable"),
    ("get", "<name> - get environment variable"),
    ("set-secret", "<name> <value> - set environment secret"),
    ("unset", "<name> - unset environment variable or secret"),
    ("list", "- list environment variables and secrets"),
    ("resolve", "<name>... - show the values the given names resolve to"),
];

/// Run `method` with raw string `args` against `store`.
///
/// Returns the text to print on success.
pub async fn dispatch(
    store: &LocalStore,
    method: &str,
    args: &[String],
) -> Result<String, CommandError> {
    match method {
        "set" => {
            let [name, value] = exact_args::<2>(args)?;
            require_name(name)?;
            store.set(name, value, false).await?;
            Ok("ok".to_string())
        }

        "set-secret" => {
            let [name, value] = exact_args::<2>(args)?;
            require_name(name)?;
            store.set(name, value, true).await?;
            Ok("ok".to_string())
        }

        "get" => {
            let [name] = exact_args::<1>(args)?;
            require_name(name)?;
            let (value, secret) = store.get(name).await;
            if value.is_empty() {
                return Err(CommandError::NotFound("the variable does not exist".to_string()));
            }
            if secret {
                return Err(CommandError::NotFound("the value is secret".to_string()));
            }
            Ok(value)
        }

        "unset" => {
            let [name] = exact_args::<1>(args)?;
            require_name(name)?;
            let (value, _) = store.get(name).await;
            if value.is_empty() {
                return Err(CommandError::NotFound("the variable does not exist".to_string()));
            }
            store.unset(name).await?;
            Ok("ok".to_string())
        }

        "list" => {
            exact_args::<0>(args)?;
            Ok(serde_json::to_string_pretty(&store.list().await)?)
        }

        "resolve" => {
            if args.is_empty() {
                return Err(CommandError::Validation(
                    "at least one argument is expected but there are 0".to_string(),
                ));
            }
            for name in args {
                require_name(name)?;
            }
            let resolved: BTreeMap<String, EnvValue> = store
                .resolve(args)
                .await
                .into_iter()
                .map(|(name, env)| {
                    let value = if env.secret { REDACTED.to_string() } else { env.value };
                    (
                        name,
                        EnvValue {
                            value,
                            secret: env.secret,
                        },
                    )
                })
                .collect();
            Ok(serde_json::to_string_pretty(&resolved)?)
        }

        other => Err(CommandError::UnknownMethod(other.to_string())),
    }
}

/// Render the method table, one `method usage` line each.
pub fn usage() -> String {
    METHODS
        .iter()
        .map(|(name, usage)| format!("{name:<12} {usage}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn exact_args<const N: usize>(args: &[String]) -> Result<&[String; N], CommandError> {
    <&[String; N]>::try_from(args).map_err(|_| {
        CommandError::Validation(format!(
            "{} expected but there are {}",
            count_words(N),
            args.len()
        ))
    })
}

fn count_words(n: usize) -> String {
    match n {
        0 => "no arguments are".to_string(),
        1 => "one argument is".to_string(),
        2 => "two arguments are".to_string(),
        n => format!("{n} arguments are"),
    }
}

fn require_name(name: &str) -> Result<(), CommandError> {
    if name.is_empty() {
        return Err(CommandError::Validation("no name was specified".to_string()));
    }
    Ok(())
}
