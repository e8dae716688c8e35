//! Folder navigation: edit every image in a directory one after another.
//!
//! [`FolderSession`] wraps one [`EditorSession`] and swaps the image and
//! mask underneath it, saving the previous mask first when auto-save is on.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::keybindings::Action;
use crate::session::{EditorSession, Outcome};

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

/// Errors from folder navigation.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Folder could not be read or written
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image folder has no supported images
    #[error("No image files found in {0:?}")]
    NoImagesFound(PathBuf),

    /// Loading or saving one image failed
    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl BatchError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Check if a path has a supported image extension
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Compare names the way people count: `img2` before `img10`, ignoring case.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let run_a = take_digits(&mut a);
                let run_b = take_digits(&mut b);
                let na = run_a.trim_start_matches('0');
                let nb = run_b.trim_start_matches('0');
                let ord = na
                    .len()
                    .cmp(&nb.len())
                    .then_with(|| na.cmp(nb))
                    .then_with(|| run_a.len().cmp(&run_b.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|n| n.to_str()).unwrap_or("")
}

/// Discover image files in a folder, non-recursively, in natural order.
pub fn discover_images(folder: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(folder)
        .map_err(|e| BatchError::io(folder, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();

    if images.is_empty() {
        return Err(BatchError::NoImagesFound(folder.to_path_buf()));
    }

    images.sort_by(|a, b| natural_cmp(file_name(a), file_name(b)));
    log::info!("📁 Found {} images in {:?}", images.len(), folder);
    Ok(images)
}

/// Editing state for a folder of images.
#[derive(Debug)]
pub struct FolderSession {
    images: Vec<PathBuf>,
    current_index: usize,
    mask_dir: PathBuf,
    output_dir: PathBuf,
    config: EditorConfig,
    auto_save: bool,
    session: Option<EditorSession>,
}

impl FolderSession {
    /// Scan `image_dir`; masks are read from `mask_dir` and written to
    /// `output_dir`. Nothing is loaded until [`FolderSession::load_current`].
    ///
    /// Mask naming, auto-save and the initial editor preferences come from
    /// `config`.
    pub fn open(
        image_dir: &Path,
        mask_dir: &Path,
        output_dir: &Path,
        config: EditorConfig,
    ) -> Result<Self, BatchError> {
        Ok(Self {
            images: discover_images(image_dir)?,
            current_index: 0,
            mask_dir: mask_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            auto_save: config.preferences.auto_save,
            config,
            session: None,
        })
    }

    /// Enable or disable saving before switching images.
    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Get the current image path.
    pub fn current_image(&self) -> &Path {
        &self.images[self.current_index]
    }

    /// Get the current image filename for display.
    pub fn current_name(&self) -> &str {
        file_name(self.current_image())
    }

    /// The loaded session, if [`FolderSession::load_current`] succeeded.
    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditorSession> {
        self.session.as_mut()
    }

    /// First existing `<mask_dir>/<mask_prefix><stem>.<ext>`.
    pub fn mask_path_for(&self, image: &Path) -> Option<PathBuf> {
        let naming = &self.config.batch;
        let stem = file_stem(image);
        naming
            .mask_extensions
            .iter()
            .map(|ext| {
                self.mask_dir
                    .join(format!("{}{}.{}", naming.mask_prefix, stem, ext))
            })
            .find(|path| path.is_file())
    }

    /// `<output_dir>/<output_prefix><stem>.png`.
    pub fn output_path_for(&self, image: &Path) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.png", self.config.batch.output_prefix, file_stem(image)))
    }

    /// Load the current image and its mask, if one exists.
    ///
    /// Editor settings carry over from the previous image.
    pub fn load_current(&mut self) -> Result<&mut EditorSession, BatchError> {
        let image = self.current_image().to_path_buf();
        let mask = self.mask_path_for(&image);
        match &mask {
            Some(path) => log::info!("Loading {:?} with mask {:?}", image, path),
            None => log::info!("Loading {:?} with a blank mask", image),
        }

        match self.session {
            Some(ref mut session) => {
                session.load_files(&image, mask.as_deref())?;
                Ok(session)
            }
            None => {
                let mut session = EditorSession::open(&image, mask.as_deref())?;
                self.config.apply_to(&mut session);
                Ok(self.session.insert(session))
            }
        }
    }

    /// Write the current mask to the output folder.
    ///
    /// Returns the written path, or `None` when nothing is loaded.
    pub fn save_current(&self) -> Result<Option<PathBuf>, BatchError> {
        let Some(session) = &self.session else {
            return Ok(None);
        };
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| BatchError::io(&self.output_dir, e))?;
        let path = self.output_path_for(self.current_image());
        session.save_mask(&path)?;
        log::info!("💾 Saved mask to {:?}", path);
        Ok(Some(path))
    }

    /// Move to the next image. Returns false at the end of the folder.
    pub fn next_image(&mut self) -> Result<bool, BatchError> {
        if self.current_index + 1 >= self.images.len() {
            return Ok(false);
        }
        self.go_to(self.current_index + 1).map(|_| true)
    }

    /// Move to the previous image. Returns false at the start of the folder.
    pub fn previous_image(&mut self) -> Result<bool, BatchError> {
        if self.current_index == 0 {
            return Ok(false);
        }
        self.go_to(self.current_index - 1).map(|_| true)
    }

    /// Jump to an image by index, saving the current mask first when
    /// auto-save is on. On a load failure the index is left unchanged.
    pub fn go_to(&mut self, index: usize) -> Result<(), BatchError> {
        if index >= self.images.len() {
            return Ok(());
        }
        if self.auto_save {
            self.save_current()?;
        }
        let previous = std::mem::replace(&mut self.current_index, index);
        if let Err(e) = self.load_current() {
            log::warn!("Failed to load {:?}: {}", self.images[index], e);
            self.current_index = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Run a bound action, handling navigation and saving here.
    pub fn perform(&mut self, action: Action) -> Result<Outcome, BatchError> {
        let moved = match action {
            Action::NextImage => self.next_image()?,
            Action::PreviousImage => self.previous_image()?,
            Action::Save => {
                self.save_current()?;
                return Ok(Outcome::Unchanged);
            }
            other => {
                return Ok(self
                    .session
                    .as_mut()
                    .map_or(Outcome::Unchanged, |s| s.perform(other)));
            }
        };
        Ok(if moved {
            Outcome::Redraw
        } else {
            Outcome::Unchanged
        })
    }

    /// Get progress string like "3/15".
    pub fn progress(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.images.len())
    }
}
