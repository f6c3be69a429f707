use std::fs::File;
use std::io::Read;
use std::path::Path;

const SNIFF_LEN: u64 = 1024;

/// A NUL byte in the first kilobyte marks a file as binary.
/// Files that cannot be opened count as binary too.
pub fn is_binary(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return true;
    };

    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    match file.take(SNIFF_LEN).read_to_end(&mut head) {
        Ok(_) => head.contains(&0),
        Err(_) => true,
    }
}
