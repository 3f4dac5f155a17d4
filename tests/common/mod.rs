#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use cgiserv::config::Config;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

pub const INDEX: &str = "<h1>index</h1>\n";
pub const NOT_FOUND_PAGE: &str = "<h1>404</h1>\n";
pub const SERVER_ERROR_PAGE: &str = "<h1>500</h1>\n";
pub const NOT_IMPLEMENTED_PAGE: &str = "<h1>501</h1>\n";
pub const BAD_REQUEST_PAGE: &str = "<h1>400</h1>\n";

/// A static root and a script root in a fresh temporary directory.
pub struct Fixture {
    pub root: PathBuf,
    pub config: Config,
}

impl Fixture {
    pub fn new(name: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!(
            "cgiserv-{}-{}-{}",
            name,
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&root);

        let staticfiles = root.join("files");
        let cgibin = root.join("cgibin");
        fs::create_dir_all(&staticfiles).unwrap();
        fs::create_dir_all(&cgibin).unwrap();

        fs::write(staticfiles.join("index.html"), INDEX).unwrap();
        fs::write(staticfiles.join("400.html"), BAD_REQUEST_PAGE).unwrap();
        fs::write(staticfiles.join("404.html"), NOT_FOUND_PAGE).unwrap();
        fs::write(staticfiles.join("500.html"), SERVER_ERROR_PAGE).unwrap();
        fs::write(staticfiles.join("501.html"), NOT_IMPLEMENTED_PAGE).unwrap();

        let config = Config {
            staticfiles,
            cgibin,
            port: 8070,
            exec: PathBuf::from("/bin/sh"),
        };

        Self { root, config }
    }

    pub fn static_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        write_under(&self.config.staticfiles, name, contents)
    }

    pub fn script(&self, name: &str, source: &str) -> PathBuf {
        write_under(&self.config.cgibin, name, source.as_bytes())
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn write_under(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

pub fn gunzip(data: &[u8]) -> Vec<u8> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).unwrap();
    out
}
