use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};

// Short content hash of everything under static/, exposed as STATIC_HASH so
// templates can append it as a cache-busting query parameter.
fn main() {
    println!("cargo:rerun-if-changed=static/");

    let mut files: Vec<_> = fs::read_dir("static")
        .expect("static/ directory is missing")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let mut hasher = DefaultHasher::new();
    for path in files {
        path.file_name().and_then(|n| n.to_str()).hash(&mut hasher);
        fs::read(&path).unwrap_or_default().hash(&mut hasher);
    }

    let digest = format!("{:016x}", hasher.finish());
    println!("cargo:rustc-env=STATIC_HASH={}", &digest[..8]);
}
