use std::{
    collections::BTreeMap,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

#[derive(Default)]
struct Sources {
    up: String,
    down: String,
}

fn main() {
    println!("cargo::rerun-if-changed=migrations");

    let out = PathBuf::from(std::env::var("OUT_DIR").unwrap()).join("migrations.rs");
    emit_migrations(&out, &collect_migrations());
    println!("cargo::rustc-env=MIGRATIONS={}", out.display());
}

fn emit_migrations(path: &Path, migrations: &BTreeMap<String, Sources>) {
    let mut writer = BufWriter::new(std::fs::File::create(path).unwrap());
    write!(&mut writer, "&[").unwrap();
    for (name, Sources { up, down }) in migrations {
        write!(
            &mut writer,
            "Migration{{name:{name:?},up:{up:?},down:{down:?}}},"
        )
        .unwrap();
    }
    write!(&mut writer, "]").unwrap();
    writer.flush().unwrap();
}

/// Migrations are stored as `migrations/<name>.up.sql` and
/// `migrations/<name>.down.sql` and applied in lexicographic order of `<name>`.
fn collect_migrations() -> BTreeMap<String, Sources> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");

    let mut out = BTreeMap::<String, Sources>::new();
    for entry in dir.read_dir().unwrap() {
        let entry = entry.unwrap();
        let file_name = entry.file_name().into_string().unwrap();

        let (name, is_up) = if let Some(name) = file_name.strip_suffix(".up.sql") {
            (name, true)
        } else if let Some(name) = file_name.strip_suffix(".down.sql") {
            (name, false)
        } else {
            continue;
        };

        let content = std::fs::read_to_string(entry.path()).unwrap();
        let sources = out.entry(name.to_owned()).or_default();
        if is_up {
            sources.up = content;
        } else {
            sources.down = content;
        }
    }

    out
}
