#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use contentdesk_api_types::PlatformLink;

use crate::args::LoginArgs;
use crate::client::CliError;

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::InputFile {
        path: path.display().to_string(),
        source,
    })
}

pub fn read_opt_value(
    val: Option<String>,
    file: Option<PathBuf>,
) -> Result<Option<String>, CliError> {
    if let Some(path) = file {
        return read_file(&path).map(Some);
    }
    Ok(val)
}

/// Password from `--password-file`, else from the environment. Trailing
/// newlines from the file are dropped.
pub fn read_password(args: &LoginArgs) -> Result<String, CliError> {
    if let Some(path) = &args.password_file {
        let raw = read_file(path)?;
        return Ok(raw.trim_end_matches(['\r', '\n']).to_string());
    }
    args.password_env
        .clone()
        .filter(|password| !password.is_empty())
        .ok_or(CliError::MissingPassword)
}

/// `PLATFORM=URL`; the URL itself may contain `=`.
pub fn parse_platform(raw: &str) -> Result<PlatformLink, CliError> {
    let (platform, link) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidInput(format!("expected PLATFORM=URL, got `{raw}`")))?;
    Ok(PlatformLink::new(platform.trim(), link.trim()))
}

pub fn parse_platforms(raw: &[String]) -> Result<Vec<PlatformLink>, CliError> {
    raw.iter().map(|item| parse_platform(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_splits_on_the_first_equals_sign() {
        let link = parse_platform("Steam = https://store.example/app?id=7").unwrap();
        assert_eq!(link, PlatformLink::new("Steam", "https://store.example/app?id=7"));
        assert!(parse_platform("Steam").is_err());
    }

    #[test]
    fn password_file_wins_and_loses_its_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"s3cret\n").unwrap();
        let args = LoginArgs {
            email: "admin@example.com".into(),
            password_file: Some(file.path().to_path_buf()),
            password_env: Some("ignored".into()),
        };
        assert_eq!(read_password(&args).unwrap(), "s3cret");

        let args = LoginArgs {
            email: "admin@example.com".into(),
            password_file: None,
            password_env: None,
        };
        assert!(matches!(read_password(&args), Err(CliError::MissingPassword)));
    }
}
