use std::{env, error::Error, fs::File, path::Path, process::ExitCode};

use classpeek_class_file::ClassFile;
use memmap::Mmap;

fn main() -> ExitCode {
    pretty_env_logger::init();

    let paths = env::args_os().skip(1).collect::<Vec<_>>();
    if paths.is_empty() {
        eprintln!("usage: classpeek <file.class>...");
        return ExitCode::FAILURE;
    }

    let mut status = ExitCode::SUCCESS;
    for path in paths {
        let path = Path::new(&path);
        if let Err(error) = dump(path) {
            log::error!("{}: {}", path.display(), error);
            status = ExitCode::FAILURE;
        }
    }
    status
}

fn dump(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = File::open(path)?;
    // the mapping is only read while the file stays open
    let mmap = unsafe { Mmap::map(&file)? };

    let class_file = ClassFile::from_bytes(&mmap)?;
    for error in &class_file.errors {
        log::warn!("{}: {}", path.display(), error);
    }

    println!("{}:", path.display());
    print!("{}", class_file);
    println!();
    Ok(())
}
