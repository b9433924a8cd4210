use std::path::PathBuf;

use anyhow::{anyhow, bail};

pub const USAGE: &str = "\
Usage: forum-archiver [--config PATH] [--verbose] [--log-file] <command>

Commands:
  archive <author>...              archive every post by these authors
  links <listing-url> [author...]  print matching post links as JSON
  discover <listing-url>           print every author on the listing as JSON
  follow <post-url>                follow the post's author and archive them
  update                           archive every followed author";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Archive { authors: Vec<String> },
    Links { listing_url: String, authors: Vec<String> },
    Discover { listing_url: String },
    Follow { post_url: String },
    Update,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub log_file: bool,
    pub command: Command,
}

/// Parse the arguments that follow the program name.
pub fn parse_args<I>(args: I) -> anyhow::Result<Cli>
where
    I: IntoIterator<Item = String>,
{
    let mut config_path = None;
    let mut verbose = false;
    let mut log_file = false;
    let mut positional = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            let value = args
                .next()
                .ok_or_else(|| anyhow!("--config requires a path"))?;
            config_path = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--config=") {
            config_path = Some(PathBuf::from(value));
        } else if arg == "--verbose" || arg == "-v" {
            verbose = true;
        } else if arg == "--log-file" {
            log_file = true;
        } else if arg == "--help" || arg == "-h" {
            positional.clear();
            positional.push("help".to_string());
            break;
        } else if arg.starts_with("--") {
            bail!("unknown option {arg}");
        } else {
            positional.push(arg);
        }
    }

    let mut positional = positional.into_iter();
    let name = positional
        .next()
        .ok_or_else(|| anyhow!("missing command"))?;
    let rest: Vec<String> = positional.collect();

    let command = match name.as_str() {
        "archive" => Command::Archive { authors: rest },
        "links" => {
            let (listing_url, authors) = split_first(rest, "links needs a listing URL")?;
            Command::Links {
                listing_url,
                authors,
            }
        }
        "discover" => Command::Discover {
            listing_url: single(rest, "discover needs exactly one listing URL")?,
        },
        "follow" => Command::Follow {
            post_url: single(rest, "follow needs exactly one post URL")?,
        },
        "update" => {
            if !rest.is_empty() {
                bail!("update takes no arguments");
            }
            Command::Update
        }
        "help" => Command::Help,
        other => bail!("unknown command {other}"),
    };

    Ok(Cli {
        config_path,
        verbose,
        log_file,
        command,
    })
}

fn split_first(mut values: Vec<String>, message: &str) -> anyhow::Result<(String, Vec<String>)> {
    if values.is_empty() {
        bail!("{message}");
    }
    let first = values.remove(0);
    Ok((first, values))
}

fn single(values: Vec<String>, message: &str) -> anyhow::Result<String> {
    match <[String; 1]>::try_from(values) {
        Ok([value]) => Ok(value),
        Err(_) => bail!("{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> anyhow::Result<Cli> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn archive_with_options() {
        let cli = parse(&["--config", "my.json", "--verbose", "archive", "Alice", "Bob"]).unwrap();
        assert_eq!(
            cli,
            Cli {
                config_path: Some(PathBuf::from("my.json")),
                verbose: true,
                log_file: false,
                command: Command::Archive {
                    authors: vec!["Alice".into(), "Bob".into()],
                },
            }
        );
    }

    #[test]
    fn options_may_follow_the_command() {
        let cli = parse(&["update", "--log-file", "--config=other.json"]).unwrap();
        assert_eq!(cli.command, Command::Update);
        assert!(cli.log_file);
        assert_eq!(cli.config_path, Some(PathBuf::from("other.json")));
    }

    #[test]
    fn links_authors_are_optional() {
        let cli = parse(&["links", "https://forum.example/list"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Links {
                listing_url: "https://forum.example/list".into(),
                authors: vec![],
            }
        );
    }

    #[test]
    fn follow_and_discover_take_one_url() {
        assert_eq!(
            parse(&["follow", "https://forum.example/p/1"]).unwrap().command,
            Command::Follow {
                post_url: "https://forum.example/p/1".into()
            }
        );
        assert!(parse(&["follow"]).is_err());
        assert!(parse(&["discover", "a", "b"]).is_err());
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--colour", "update"]).is_err());
        assert!(parse(&["update", "extra"]).is_err());
    }

    #[test]
    fn help_wins_over_everything_else() {
        assert_eq!(parse(&["archive", "--help"]).unwrap().command, Command::Help);
    }
}
