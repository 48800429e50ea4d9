//! Host terminal setup: unbuffered no-echo input for the duration of a run,
//! restored on every exit path including Ctrl+C.

use std::io::{Write, stdin, stdout};
use std::os::fd::{AsRawFd, RawFd};
use std::process::exit;
use std::sync::OnceLock;
use termios::{ECHO, ICANON, TCSAFLUSH, Termios};

/// Terminal state saved before entering raw mode, shared with the signal
/// handler which cannot receive it as an argument.
static ORIGINAL_MODE: OnceLock<(RawFd, Termios)> = OnceLock::new();

/// Restores the terminal mode while the lock is alive and puts it back on
/// `Drop`.
pub struct RawLock {
    fd: RawFd,
    termios_orig: Termios,
}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        let _ = termios::tcsetattr(self.fd, TCSAFLUSH, &self.termios_orig);
    }
}

/// Switches stdin to unbuffered no-echo mode.
///
/// Only line buffering and echoing are disabled; signal generation stays on
/// so Ctrl+C still raises SIGINT for [`install_interrupt_handler`].
///
/// # Errors
/// - stdin is not a terminal or the mode change was rejected
pub fn set_terminal_raw() -> Result<RawLock, std::io::Error> {
    let fd = stdin().as_raw_fd();
    let termios_orig = Termios::from_fd(fd)?;
    let mut termios_raw = termios_orig;
    // https://man7.org/linux/man-pages/man3/termios.3.html
    termios_raw.c_lflag &= !(ICANON | ECHO);
    termios::tcsetattr(fd, TCSAFLUSH, &termios_raw)?;
    let _ = ORIGINAL_MODE.set((fd, termios_orig));
    Ok(RawLock { fd, termios_orig })
}

extern "C" fn handle_interrupt(_signal: libc::c_int) {
    if let Some((fd, termios_orig)) = ORIGINAL_MODE.get() {
        let _ = termios::tcsetattr(*fd, TCSAFLUSH, termios_orig);
    }
    let mut out = stdout();
    let _ = out.write_all(b"\n");
    let _ = out.flush();
    exit(-2);
}

/// Installs the SIGINT handler that restores the terminal before exiting
/// with the abnormal-termination code.
pub fn install_interrupt_handler() {
    let handler: extern "C" fn(libc::c_int) = handle_interrupt;
    #[expect(
        clippy::fn_to_numeric_cast_any,
        reason = "libc::signal takes the handler as a sighandler_t integer"
    )]
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}
