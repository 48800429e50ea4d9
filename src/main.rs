use lc3_vm::emulator::Emulator;
use lc3_vm::hardware::TerminalInputProvider;
use lc3_vm::terminal;
use std::io::stdout;
use std::process::exit;

fn main() {
    let image_paths: Vec<String> = std::env::args().skip(1).collect();
    if image_paths.is_empty() {
        eprintln!("lc3 [image-file1] ...");
        exit(2);
    }

    let mut emu = Emulator::new(TerminalInputProvider::new(), stdout());
    for path in &image_paths {
        if let Err(e) = emu.load_image_file(path) {
            eprintln!("failed to load image: {path}");
            eprintln!("{e}");
            exit(1);
        }
    }

    terminal::install_interrupt_handler();
    let raw_lock = match terminal::set_terminal_raw() {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("cannot switch the terminal to raw mode: {e}");
            exit(1);
        }
    };

    let result = emu.execute();
    // back to line-buffered echoing mode before reporting anything
    drop(raw_lock);
    if let Err(e) = result {
        eprintln!("{e}");
        exit(1);
    }
}
