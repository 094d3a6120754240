/// Storage of uploaded post images
///
/// Files land under `<root>/<upload_to>/<name>` and are referenced from the
/// database by the relative path `<upload_to>/<name>`. Names are reduced to
/// a safe final component; an existing file is never overwritten, the new
/// upload gets a random suffix instead.
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::io;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Upload directory for post images, relative to the media root.
pub const POST_IMAGE_DIR: &str = "posts";

const SUFFIX_LEN: usize = 7;
const MAX_NAME_ATTEMPTS: usize = 100;

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Public URL of a stored file.
    pub fn url_for(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.url_prefix.trim_end_matches('/'),
            relative_path.trim_start_matches('/')
        )
    }

    /// Write `data` under `upload_to` and return the stored relative path.
    pub async fn save(&self, upload_to: &str, filename: &str, data: &[u8]) -> io::Result<String> {
        let name = clean_filename(filename).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unusable upload filename: {:?}", filename),
            )
        })?;

        let dir = self.root.join(upload_to);
        tokio::fs::create_dir_all(&dir).await?;

        let mut candidate = name.clone();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(data).await?;
                    file.flush().await?;
                    let relative = format!("{}/{}", upload_to.trim_matches('/'), candidate);
                    tracing::debug!(path = %relative, bytes = data.len(), "stored upload");
                    return Ok(relative);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = with_suffix(&name, &random_suffix());
                }
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for upload {:?}", name),
        ))
    }

    /// Delete a stored file by its relative path.
    pub async fn remove(&self, relative_path: &str) -> io::Result<()> {
        tokio::fs::remove_file(self.root.join(relative_path.trim_start_matches('/'))).await
    }
}

/// Final path component with whitespace turned into `_` and anything other
/// than word characters, `-` and `.` dropped.
pub fn clean_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}

fn with_suffix(name: &str, suffix: &str) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], suffix, &name[dot..]),
        _ => format!("{}_{}", name, suffix),
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}
