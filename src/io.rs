use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError, RgbaImage};
use rfd::FileDialog;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Image shown in the first window at startup.
pub const DEFAULT_IMAGE: &[u8] = include_bytes!("../assets/default.png");

/// Extensions offered by the open dialog. Decoding itself sniffs the content.
const OPEN_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum ImageIoError {
    Io(std::io::Error),
    Decode(ImageError),
    Encode(ImageError),
    /// Decoded image has no pixels.
    Empty,
}

impl std::fmt::Display for ImageIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageIoError::Io(e) => write!(f, "I/O error: {}", e),
            ImageIoError::Decode(e) => write!(f, "Decode error: {}", e),
            ImageIoError::Encode(e) => write!(f, "Encode error: {}", e),
            ImageIoError::Empty => write!(f, "Image has no pixels"),
        }
    }
}

impl std::error::Error for ImageIoError {}

impl From<std::io::Error> for ImageIoError {
    fn from(e: std::io::Error) -> Self {
        ImageIoError::Io(e)
    }
}

// ============================================================================
// DECODE / ENCODE
// ============================================================================

/// Decode a PNG, JPEG or GIF stream into an RGBA raster with its origin at (0, 0).
/// The format is detected from the stream contents, not from any file name.
pub fn decode<R: BufRead + Seek>(reader: R) -> Result<RgbaImage, ImageIoError> {
    let img = image::io::Reader::new(reader)
        .with_guessed_format()?
        .decode()
        .map_err(ImageIoError::Decode)?;
    let rgba = img.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ImageIoError::Empty);
    }
    Ok(rgba)
}

pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage, ImageIoError> {
    decode(Cursor::new(bytes))
}

/// Read and decode the image at `path`.
pub fn load_path(path: &Path) -> Result<RgbaImage, ImageIoError> {
    let file = File::open(path)?;
    decode(BufReader::new(file))
}

/// The embedded startup image.
pub fn load_default() -> Result<RgbaImage, ImageIoError> {
    decode_bytes(DEFAULT_IMAGE)
}

/// Write `image` as PNG with the encoder's default settings.
pub fn encode_png<W: Write>(image: &RgbaImage, writer: W) -> Result<(), ImageIoError> {
    PngEncoder::new(writer)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(ImageIoError::Encode)
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), ImageIoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_png(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

// ============================================================================
// BACKGROUND OPEN / SAVE
// ============================================================================

/// Completion message from a background open or save.
pub enum IoResult {
    Opened { image: RgbaImage, path: PathBuf },
    OpenFailed { path: PathBuf, error: ImageIoError },
    Saved { path: PathBuf },
    SaveFailed { path: PathBuf, error: ImageIoError },
}

/// Decode `path` on the rayon pool and report through `sender`.
/// `wake` is called after the message is sent so the UI polls promptly.
pub fn spawn_open<F>(path: PathBuf, sender: mpsc::Sender<IoResult>, wake: F)
where
    F: Fn() + Send + 'static,
{
    rayon::spawn(move || {
        let msg = match load_path(&path) {
            Ok(image) => IoResult::Opened { image, path },
            Err(error) => IoResult::OpenFailed { path, error },
        };
        let _ = sender.send(msg);
        wake();
    });
}

/// Encode `image` as PNG into `path` on the rayon pool.
pub fn spawn_save<F>(image: RgbaImage, path: PathBuf, sender: mpsc::Sender<IoResult>, wake: F)
where
    F: Fn() + Send + 'static,
{
    rayon::spawn(move || {
        let msg = match save_png(&image, &path) {
            Ok(()) => IoResult::Saved { path },
            Err(error) => IoResult::SaveFailed { path, error },
        };
        let _ = sender.send(msg);
        wake();
    });
}

// ============================================================================
// FILE HANDLER
// ============================================================================

/// Native open/save dialogs. Remembers the last directory used.
#[derive(Default)]
pub struct FileHandler {
    last_dir: Option<PathBuf>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocking open dialog. `None` means the user dismissed it.
    pub fn pick_open_path(&mut self) -> Option<PathBuf> {
        let path = self
            .dialog()
            .add_filter("Images", OPEN_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_file()?;
        self.remember(&path);
        Some(path)
    }

    /// Blocking save dialog proposing `<stem>.png`.
    pub fn pick_save_path(&mut self, name: &str) -> Option<PathBuf> {
        let path = self
            .dialog()
            .add_filter("PNG", &["png"])
            .set_file_name(suggested_file_name(name))
            .save_file()?;
        self.remember(&path);
        Some(path)
    }

    fn dialog(&self) -> FileDialog {
        match &self.last_dir {
            Some(dir) => FileDialog::new().set_directory(dir),
            None => FileDialog::new(),
        }
    }

    fn remember(&mut self, path: &Path) {
        self.last_dir = path.parent().map(Path::to_path_buf);
    }
}

/// `sprite.gif` -> `sprite.png`, `Untitled-2` -> `Untitled-2.png`.
fn suggested_file_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    format!("{}.png", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::Duration;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([
                (x * 37 % 256) as u8,
                (y * 91 % 256) as u8,
                ((x + y) * 13 % 256) as u8,
                if (x + y) % 3 == 0 { 0 } else { 200 },
            ])
        })
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pixelart-{}-{}", std::process::id(), name))
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let img = checker(13, 7);
        let mut bytes = Vec::new();
        encode_png(&img, &mut bytes).unwrap();
        assert_eq!(decode_bytes(&bytes).unwrap(), img);
    }

    #[test]
    fn gif_and_jpeg_are_detected_from_content() {
        use image::codecs::gif::GifEncoder;
        use image::codecs::jpeg::JpegEncoder;
        use image::{DynamicImage, ImageFormat};

        let img = checker(4, 3);

        let mut gif = Vec::new();
        GifEncoder::new(&mut gif)
            .encode(img.as_raw(), 4, 3, ColorType::Rgba8)
            .unwrap();
        assert_eq!(image::guess_format(&gif).unwrap(), ImageFormat::Gif);
        assert_eq!(decode_bytes(&gif).unwrap().dimensions(), (4, 3));

        let rgb = DynamicImage::ImageRgba8(img).into_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new(&mut jpeg)
            .encode(rgb.as_raw(), 4, 3, ColorType::Rgb8)
            .unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = decode_bytes(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert!(decoded.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageIoError::Decode(_)), "{}", err);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_path(Path::new("/nonexistent/pixelart/nope.png")).unwrap_err();
        assert!(matches!(err, ImageIoError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn embedded_default_decodes() {
        let img = load_default().unwrap();
        assert!(img.width() > 0 && img.height() > 0);
    }

    #[test]
    fn save_then_load_from_disk() {
        let path = temp_path("roundtrip.png");
        let img = checker(5, 9);
        save_png(&img, &path).unwrap();
        assert_eq!(load_path(&path).unwrap(), img);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn background_open_reports_completion() {
        let path = temp_path("async.png");
        save_png(&checker(3, 3), &path).unwrap();

        let (tx, rx) = mpsc::channel();
        spawn_open(path.clone(), tx.clone(), || {});
        match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            IoResult::Opened { image, path: p } => {
                assert_eq!(p, path);
                assert_eq!(image.dimensions(), (3, 3));
            }
            _ => panic!("expected Opened"),
        }

        let missing = temp_path("missing.png");
        spawn_open(missing.clone(), tx, || {});
        match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            IoResult::OpenFailed { path: p, error } => {
                assert_eq!(p, missing);
                assert!(matches!(error, ImageIoError::Io(_)));
            }
            _ => panic!("expected OpenFailed"),
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn background_save_writes_png() {
        let path = temp_path("async-save.png");
        let img = checker(4, 2);
        let (tx, rx) = mpsc::channel();
        spawn_save(img.clone(), path.clone(), tx, || {});
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(10)).unwrap(),
            IoResult::Saved { .. }
        ));
        assert_eq!(load_path(&path).unwrap(), img);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_name_always_ends_in_png() {
        assert_eq!(suggested_file_name("sprite.gif"), "sprite.png");
        assert_eq!(suggested_file_name("Untitled-2"), "Untitled-2.png");
    }
}
