//! Command-line parsing and dispatch.

use anyhow::{bail, Result};
use maestro_core::models::{Mood, PlaylistRequest};
use maestro_core::{ApiClient, Config};
use tracing::info;

use crate::render;

/// Number of playlists shown on the dashboard
const DASHBOARD_PLAYLISTS: usize = 5;

pub const USAGE: &str = "\
Usage: maestro <command>

Commands:
  login                         Print the Spotify authorization URL
  callback <code-or-url>        Finish logging in with the code from the redirect
  logout                        Forget the stored session
  status                        Show who is logged in
  refresh                       Refresh the access token now
  profile                       Show your Spotify profile
  dashboard                     Latest analysis and recent playlists
  analyze                       Generate a new music personality analysis
  analysis                      Show your latest analysis
  generate [--mood M] [--prompt P]
                                Generate a playlist from a mood and/or prompt
  playlists                     List your generated playlists
  config set-url <url>          Save the backend URL
";

#[derive(Debug, Clone)]
pub enum Command {
    Login,
    Callback(String),
    Logout,
    Status,
    Refresh,
    Profile,
    Dashboard,
    Analyze,
    Analysis,
    Generate(PlaylistRequest),
    Playlists,
    SetUrl(String),
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        let command = match name.as_str() {
            "login" => Command::Login,
            "callback" => match rest {
                [code] => Command::Callback(code.clone()),
                _ => bail!("callback takes the code or the full redirect URL"),
            },
            "logout" => Command::Logout,
            "status" => Command::Status,
            "refresh" => Command::Refresh,
            "profile" => Command::Profile,
            "dashboard" => Command::Dashboard,
            "analyze" => Command::Analyze,
            "analysis" => Command::Analysis,
            "generate" => Command::Generate(Self::parse_generate(rest)?),
            "playlists" => Command::Playlists,
            "config" => match rest {
                [sub, url] if sub == "set-url" => Command::SetUrl(url.clone()),
                _ => bail!("usage: maestro config set-url <url>"),
            },
            "help" | "-h" | "--help" => Command::Help,
            other => bail!("unknown command: {}", other),
        };
        Ok(command)
    }

    fn parse_generate(args: &[String]) -> Result<PlaylistRequest> {
        let mut request = PlaylistRequest::default();
        let mut iter = args.iter();
        while let Some(flag) = iter.next() {
            let Some(value) = iter.next() else {
                bail!("{} needs a value", flag);
            };
            match flag.as_str() {
                "--mood" | "-m" => request.mood = Some(value.parse::<Mood>()?),
                "--prompt" | "-p" => request.prompt = Some(value.clone()),
                other => bail!("unknown option for generate: {}", other),
            }
        }
        request.validate()?;
        Ok(request)
    }
}

pub async fn run(api: &ApiClient, config: &Config, command: Command) -> Result<()> {
    let store = api.store();
    match command {
        Command::Help => print!("{}", USAGE),
        Command::SetUrl(url) => {
            let updated = config.clone().with_api_url_override(Some(url));
            updated.save()?;
            println!("Backend URL set to {}", updated.api_url);
        }
        Command::Login => {
            let url = store.login().await?;
            println!("Open this URL in your browser to connect Spotify:\n\n  {}\n", url);
            println!("Then run `maestro callback <redirect-url>` with the URL you land on.");
        }
        Command::Callback(input) => {
            let session = store.complete_login_from_redirect(&input).await?;
            info!(user_id = session.user_id, "Connected Spotify account");
            println!("You have successfully connected your Spotify account ({}).", session.spotify_id);
        }
        Command::Logout => {
            store.logout().await;
            println!("You have been successfully logged out.");
        }
        Command::Status => {
            print!("{}", render::status(store.state(), store.session().await.as_ref()));
        }
        Command::Refresh => {
            store.refresh().await?;
            print!("{}", render::status(store.state(), store.session().await.as_ref()));
        }
        Command::Profile => {
            let user_id = store.require_user_id().await?;
            let profile = api.get_user_profile(user_id).await?;
            let spotify_id = store
                .session()
                .await
                .map(|s| s.spotify_id)
                .unwrap_or_default();
            print!("{}", render::profile(&profile, &spotify_id));
        }
        Command::Dashboard => {
            let user_id = store.require_user_id().await?;
            let dashboard = api.fetch_dashboard(user_id).await?;
            print!("{}", render::dashboard(&dashboard, DASHBOARD_PLAYLISTS));
        }
        Command::Analyze => {
            let user_id = store.require_user_id().await?;
            eprintln!("Analyzing your listening history...");
            let analysis = api.analyze_user(user_id).await?;
            print!("{}", render::analysis(&analysis));
        }
        Command::Analysis => {
            let user_id = store.require_user_id().await?;
            let analyses = api.get_user_analyses(user_id).await?;
            match analyses.first() {
                Some(latest) => print!("{}", render::analysis(latest)),
                None => println!("No analysis yet. Run `maestro analyze` to generate one."),
            }
        }
        Command::Generate(request) => {
            let user_id = store.require_user_id().await?;
            eprintln!("Generating your playlist...");
            let playlist = api.generate_playlist(user_id, &request).await?;
            println!("Your playlist has been created and saved to your Spotify account.\n");
            print!("{}", render::playlists(std::slice::from_ref(&playlist)));
        }
        Command::Playlists => {
            let user_id = store.require_user_id().await?;
            let playlists = api.get_user_playlists(user_id).await?;
            if playlists.is_empty() {
                println!("No playlists yet. Run `maestro generate --mood Happy` to create one.");
            } else {
                print!("{}", render::playlists(&playlists));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple_commands() {
        assert!(matches!(Command::parse(&args(&[])).unwrap(), Command::Help));
        assert!(matches!(Command::parse(&args(&["login"])).unwrap(), Command::Login));
        assert!(matches!(Command::parse(&args(&["playlists"])).unwrap(), Command::Playlists));
        assert!(Command::parse(&args(&["dance"])).is_err());
    }

    #[test]
    fn test_parse_callback() {
        match Command::parse(&args(&["callback", "http://x/callback?code=abc"])).unwrap() {
            Command::Callback(input) => assert_eq!(input, "http://x/callback?code=abc"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Command::parse(&args(&["callback"])).is_err());
    }

    #[test]
    fn test_parse_generate() {
        match Command::parse(&args(&["generate", "--mood", "chill", "--prompt", "sunday morning"])).unwrap() {
            Command::Generate(request) => {
                assert_eq!(request.mood, Some(Mood::Chill));
                assert_eq!(request.prompt.as_deref(), Some("sunday morning"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Command::parse(&args(&["generate"])).is_err());
        assert!(Command::parse(&args(&["generate", "--mood"])).is_err());
        assert!(Command::parse(&args(&["generate", "--mood", "grumpy"])).is_err());
        assert!(Command::parse(&args(&["generate", "--tempo", "fast"])).is_err());
    }

    #[test]
    fn test_parse_config() {
        let command = Command::parse(&args(&["config", "set-url", "https://api.example.com"])).unwrap();
        assert!(matches!(command, Command::SetUrl(ref url) if url == "https://api.example.com"));
        assert!(Command::parse(&args(&["config", "get"])).is_err());
    }
}
