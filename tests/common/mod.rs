#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

/// Serializes tests that write and then exec scripts, so no sibling thread
/// forks while a script is still open for writing ("text file busy").
static EXEC_LOCK: Mutex<()> = Mutex::new(());

pub fn exec_lock() -> MutexGuard<'static, ()> {
    EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Solid-colour frames, distinct per index.
pub const COLORS: [[u8; 4]; 4] = [
    [255, 0, 0, 255],
    [0, 255, 0, 255],
    [0, 0, 255, 255],
    [255, 255, 255, 255],
];

pub fn write_frame(path: &Path, rgba: [u8; 4], width: u32, height: u32) {
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save(path)
        .unwrap();
}

/// Writes `puzzle_state00.png` .. one per colour into `dir`.
pub fn write_frames(dir: &Path, width: u32, height: u32) -> Vec<PathBuf> {
    COLORS
        .iter()
        .enumerate()
        .map(|(i, rgba)| {
            let path = dir.join(format!("puzzle_state{i:02}.png"));
            write_frame(&path, *rgba, width, height);
            path
        })
        .collect()
}

#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::{io::Write as _, os::unix::fs::PermissionsExt as _};

    {
        let mut f = std::fs::File::create(path).unwrap();
        writeln!(f, "#!/bin/sh").unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f.sync_all().unwrap();
    }
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Stand-in tools living outside the working directory.
pub struct StubTools {
    pub root: tempfile::TempDir,
    pub blender: PathBuf,
    pub ffmpeg: PathBuf,
    pub templates: PathBuf,
}

impl StubTools {
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Everything the stub renderer saw, one item per line.
    pub fn blender_log(&self) -> String {
        std::fs::read_to_string(self.root().join("blender.log")).unwrap_or_default()
    }

    pub fn ffmpeg_calls(&self) -> usize {
        std::fs::read_to_string(self.root().join("ffmpeg.log"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }
}

/// Renderer stub copying the template frames into its cwd; encoder stub writing
/// `<filter>\n` followed by the staged frames concatenated in sequence order.
///
/// `render_frames: false` makes the renderer exit 0 without writing frames.
/// `fail_on` makes the encoder exit 1 for that filter (`reverse` / `forward`).
#[cfg(unix)]
pub fn stub_tools(render_frames: bool, fail_on: Option<&str>) -> StubTools {
    let root = tempfile::tempdir().unwrap();
    let templates = root.path().join("templates");
    std::fs::create_dir(&templates).unwrap();
    write_frames(&templates, 8, 6);

    let log = root.path().join("blender.log");
    let copy = if render_frames {
        format!("cp {}/puzzle_state*.png .\n", templates.display())
    } else {
        String::new()
    };
    let blender = root.path().join("blender");
    write_script(
        &blender,
        &format!(
            "printf 'PYTHONPATH=%s\\n' \"$PYTHONPATH\" > {log}\n\
             printf '%s\\n' \"$@\" >> {log}\n\
             {copy}",
            log = log.display()
        ),
    );

    let ffmpeg_log = root.path().join("ffmpeg.log");
    let fail = match fail_on {
        Some(mode) => format!(
            "if [ \"$mode\" = \"{mode}\" ]; then echo \"stub encoder refused {mode}\" >&2; exit 1; fi\n"
        ),
        None => String::new(),
    };
    let ffmpeg = root.path().join("ffmpeg");
    write_script(
        &ffmpeg,
        &format!(
            "echo \"$*\" >> {log}\n\
             mode=forward\n\
             prev=\"\"\n\
             for arg in \"$@\"; do\n\
               case \"$prev\" in\n\
                 -i) input=\"$arg\" ;;\n\
                 -vf) mode=\"$arg\" ;;\n\
               esac\n\
               prev=\"$arg\"\n\
               out=\"$arg\"\n\
             done\n\
             {fail}\
             printf '%s\\n' \"$mode\" > \"$out\"\n\
             for f in \"$(dirname \"$input\")\"/*.png; do cat \"$f\" >> \"$out\"; done\n",
            log = ffmpeg_log.display()
        ),
    );

    StubTools {
        root,
        blender,
        ffmpeg,
        templates,
    }
}

/// Expected stub encoder output for the frames in `workdir`, in the given order.
pub fn expected_stub_video(mode: &str, frames: &[PathBuf]) -> Vec<u8> {
    let mut out = format!("{mode}\n").into_bytes();
    for f in frames {
        out.extend(std::fs::read(f).unwrap());
    }
    out
}

pub fn workdir_with_script() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("piece_rendering.py"), "# rendered by blender\n").unwrap();
    dir
}
