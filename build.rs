use std::{env, fs, path::Path, path::PathBuf};

/// A directory of command modules, mirrored as a tree of inline modules.
#[derive(Default)]
struct ModuleDir {
    files: Vec<(String, PathBuf)>,
    dirs: Vec<(String, ModuleDir)>,
}

impl ModuleDir {
    fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.iter().all(|(_, dir)| dir.is_empty())
    }
}

fn module_name(stem: &str) -> String {
    stem.replace('-', "_")
}

fn collect(dir: &Path) -> ModuleDir {
    let mut module = ModuleDir::default();

    let mut entries = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect::<Vec<_>>();
    entries.sort();

    for path in entries {
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();

        if path.is_dir() {
            let child = collect(&path);
            if !child.is_empty() {
                module.dirs.push((module_name(&file_name), child));
            }
            continue;
        }

        // Private units and directory roots are never discovered
        if file_name.starts_with('_') || file_name == "mod.rs" {
            continue;
        }
        if path.extension().map(|e| e == "rs").unwrap_or(false) {
            let stem = path.file_stem().unwrap().to_string_lossy().to_string();
            let abs_path = path.canonicalize().unwrap();
            module.files.push((module_name(&stem), abs_path));
        }
    }

    module
}

fn emit_modules(module: &ModuleDir, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);

    for (name, path) in &module.files {
        let path_str = path.to_string_lossy().replace('\\', "/");
        out.push_str(&format!("{indent}#[path = \"{path_str}\"]\n"));
        out.push_str(&format!("{indent}pub mod {name};\n"));
    }

    for (name, dir) in &module.dirs {
        out.push_str(&format!("{indent}pub mod {name} {{\n"));
        emit_modules(dir, depth + 1, out);
        out.push_str(&format!("{indent}}}\n"));
    }
}

fn module_paths(module: &ModuleDir, prefix: &str, paths: &mut Vec<String>) {
    for (name, _) in &module.files {
        paths.push(format!("{prefix}{name}"));
    }
    for (name, dir) in &module.dirs {
        module_paths(dir, &format!("{prefix}{name}::"), paths);
    }
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dst = Path::new(&out_dir).join("commands.rs");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let commands_dir = Path::new(&manifest_dir).join("src/commands");

    let tree = collect(&commands_dir);
    let mut paths = Vec::new();
    module_paths(&tree, "", &mut paths);

    let mut mods = String::new();
    emit_modules(&tree, 0, &mut mods);

    mods.push('\n');
    mods.push_str("/// Auto-generated discovery: registers every command module exactly once.\n");
    mods.push_str("pub fn discover(registry: &mut crate::registry::Registry) {\n");
    for path in &paths {
        mods.push_str(&format!("    {path}::register(registry);\n"));
    }
    mods.push_str("}\n");

    mods.push('\n');
    mods.push_str("/// Discovered command modules, relative to `src/commands`.\n");
    mods.push_str("pub const MODULES: &[&str] = &[\n");
    for path in &paths {
        mods.push_str(&format!("    \"{path}\",\n"));
    }
    mods.push_str("];\n");

    fs::write(&dst, mods).unwrap();
    println!("cargo:rerun-if-changed=src/commands");
}
