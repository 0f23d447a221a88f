use std::path::PathBuf;

use gumdrop::{Options, ParsingStyle};

use crate::{
    cmd::SystemRunner,
    config::{process_env, Layout, Settings},
    driver::Driver,
    error::Error,
    net::HttpClient,
    types::Invocation,
};

const USAGE: &str = "\
Usage: install-matrix [OPTIONS] test-all
Usage: install-matrix [OPTIONS] platform method [linkage]

platform:
  ios
  osx
  tvos
  visionos
  watchos
  catalyst

method:
  cocoapods
  carthage
  spm
  xcframework

linkage:
  static
  dynamic (default)

environment variables:
  REALM_XCODE_VERSION: Xcode version to use
  REALM_TEST_RELEASE: Version number to test, or \"latest\" to test the latest release
  REALM_TEST_BRANCH: Name of a branch to test";

#[derive(Debug, Options)]
pub struct Args {
    #[options(help = "show help information")]
    help: bool,

    #[options(
        meta = "DIR",
        help = "directory holding the example projects (default: current directory)"
    )]
    example_dir: Option<PathBuf>,

    #[options(
        meta = "DIR",
        help = "root of the library checkout (default: two levels above the example directory)"
    )]
    repo_root: Option<PathBuf>,

    #[options(free)]
    invocation: Vec<String>,
}

/// Outcome of a run that did not fail.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    HelpShown,
}

pub fn print_usage() {
    println!("{}", USAGE);
    println!();
    println!("options:");
    println!("{}", Args::usage());
}

fn parse_args(args: &[String]) -> Result<Args, Error> {
    let args = args.iter().map(|x| &**x).collect::<Vec<_>>();
    Args::parse_args(&args, ParsingStyle::AllOptions).map_err(|e| Error::Usage(e.to_string()))
}

pub(crate) async fn run(args: Vec<String>) -> Result<Outcome, Error> {
    log::trace!("Args: {:?}", args);

    let args = parse_args(&args)?;
    if args.help_requested() {
        print_usage();
        return Ok(Outcome::HelpShown);
    }
    let invocation = Invocation::parse(args.invocation.as_slice())?;

    let example_dir = match args.example_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let layout = Layout::new(example_dir, args.repo_root);
    log::debug!("{:?}", layout);

    let runner = SystemRunner;
    let network = HttpClient::new()?;
    let settings = Settings::resolve(&runner, &network, &layout, &process_env()).await?;

    Driver::new(runner, network, layout, settings)
        .run(invocation)
        .await?;
    Ok(Outcome::Passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_parse_positionals_and_options() {
        let args = parse_args(&strings(&[
            "--example-dir",
            "/repo/examples/installation",
            "ios",
            "spm",
        ]))
        .unwrap();

        assert_eq!(
            args.example_dir,
            Some(PathBuf::from("/repo/examples/installation"))
        );
        assert_eq!(args.repo_root, None);
        assert_eq!(args.invocation, vec!["ios", "spm"]);
    }

    #[test]
    fn test_parse_unknown_option_is_usage_error() {
        let result = parse_args(&strings(&["--platform", "ios"]));
        assert!(matches!(result, Err(Error::Usage(_))));
    }

    #[tokio::test]
    async fn test_run_without_arguments_is_usage_error() {
        let result = run(vec![]).await;
        assert!(matches!(result, Err(Error::Usage(_))));
    }

    #[tokio::test]
    async fn test_run_help() {
        let result = run(strings(&["--help"])).await;
        assert_eq!(result.unwrap(), Outcome::HelpShown);
    }

    #[test]
    fn test_usage_lists_every_token() {
        use crate::types::{Method, Platform};

        for platform in Platform::ALL {
            assert!(USAGE.contains(&format!("  {}\n", platform)), "{platform}");
        }
        for method in Method::ALL {
            assert!(USAGE.contains(&format!("  {}\n", method)), "{method}");
        }
    }
}
