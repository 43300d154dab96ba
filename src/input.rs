use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;

pub fn read_file(path: &Path) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut buf))
        .with_context(|| format!("could not read `{}`", path.display()))?;

    String::from_utf8(buf).with_context(|| format!("`{}` is not valid UTF-8", path.display()))
}
