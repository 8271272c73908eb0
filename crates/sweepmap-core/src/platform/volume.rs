/// Volume classification: is a scan root on an internal, removable, or
/// network volume?
///
/// Callers use this before starting a scan so slow remote roots can be
/// confirmed by the user first.
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeKind {
    Internal,
    Removable,
    Network,
}

impl VolumeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Internal => "Internal",
            Self::Removable => "Removable",
            Self::Network => "Network",
        }
    }

    /// Non-internal volumes are typically much slower to enumerate.
    pub fn is_slow(self) -> bool {
        self != Self::Internal
    }
}

/// File-system types served over the network.
const NETWORK_FS_TYPES: &[&str] = &[
    "nfs", "nfs4", "cifs", "smbfs", "smb3", "afpfs", "sshfs", "fuse.sshfs", "davfs", "webdav",
    "9p", "ceph", "glusterfs", "fuse.rclone",
];

/// Mount roots conventionally used for hot-plugged media.
const REMOVABLE_MOUNT_ROOTS: &[&str] = &["/media", "/run/media", "/Volumes"];

/// One line of a mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub mount_point: String,
    pub fs_type: String,
}

/// Parse `/proc/self/mounts` content. Octal escapes (`\040` for space)
/// in mount points are decoded.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub fn parse_mounts(text: &str) -> Vec<MountEntry> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _device = fields.next()?;
            let mount_point = decode_octal_escapes(fields.next()?);
            let fs_type = fields.next()?.to_string();
            Some(MountEntry {
                mount_point,
                fs_type,
            })
        })
        .collect()
}

fn decode_octal_escapes(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let is_escape = bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b));
        if is_escape {
            let code = bytes[i + 1..i + 4]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            out.push(code as u8);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Classify `path` against a mount table: the longest mount point that
/// contains the path decides.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub fn classify_with_mounts(path: &Path, mounts: &[MountEntry]) -> VolumeKind {
    let best = mounts
        .iter()
        .filter(|m| path.starts_with(&m.mount_point))
        .max_by_key(|m| m.mount_point.len());

    match best {
        Some(m) if NETWORK_FS_TYPES.contains(&m.fs_type.as_str()) => VolumeKind::Network,
        Some(m) if is_under_removable_root(Path::new(&m.mount_point)) => VolumeKind::Removable,
        _ => VolumeKind::Internal,
    }
}

fn is_under_removable_root(path: &Path) -> bool {
    REMOVABLE_MOUNT_ROOTS
        .iter()
        .any(|root| path.starts_with(root) && path != Path::new(root))
}

/// Classify the volume holding `path`.
#[cfg(target_os = "linux")]
pub fn classify_volume(path: &Path) -> VolumeKind {
    match std::fs::read_to_string("/proc/self/mounts") {
        Ok(text) => classify_with_mounts(path, &parse_mounts(&text)),
        Err(err) => {
            tracing::debug!("mount table unavailable: {err}");
            VolumeKind::Internal
        }
    }
}

/// macOS mounts every non-boot volume under `/Volumes`.
#[cfg(target_os = "macos")]
pub fn classify_volume(path: &Path) -> VolumeKind {
    if is_under_removable_root(path) {
        VolumeKind::Removable
    } else {
        VolumeKind::Internal
    }
}

#[cfg(windows)]
pub fn classify_volume(path: &Path) -> VolumeKind {
    use std::path::Component;
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::GetDriveTypeW;

    // Drive type constants from the Windows API.
    const DRIVE_REMOVABLE_VAL: u32 = 2;
    const DRIVE_REMOTE_VAL: u32 = 4;
    const DRIVE_CDROM_VAL: u32 = 5;

    let root = match path.components().next() {
        Some(Component::Prefix(prefix)) => {
            format!("{}\\", prefix.as_os_str().to_string_lossy())
        }
        _ => return VolumeKind::Internal,
    };
    let root_wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
    let raw_type = unsafe { GetDriveTypeW(PCWSTR(root_wide.as_ptr())) };

    match raw_type {
        DRIVE_REMOTE_VAL => VolumeKind::Network,
        DRIVE_REMOVABLE_VAL | DRIVE_CDROM_VAL => VolumeKind::Removable,
        _ => VolumeKind::Internal,
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
pub fn classify_volume(_path: &Path) -> VolumeKind {
    VolumeKind::Internal
}
