use std::path::{Path, PathBuf};

pub fn load_binary(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|err| format!("Failed to read {:?}: {}", path, err))
}

pub fn load_text(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|err| format!("Failed to read {:?}: {}", path, err))
}

/// Directory that relative texture paths inside a model file are resolved against.
pub fn directory_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolves a resource URI referenced by a model file: `data:` URIs are decoded
/// in place, anything else is read relative to `base`.
pub fn load_external_resource(base: &Path, uri: &str) -> Result<Vec<u8>, String> {
    if let Some(rest) = uri.strip_prefix("data:") {
        let (_, encoded) = rest
            .split_once(',')
            .ok_or_else(|| format!("Malformed data URI: {}", truncate(uri)))?;
        return base64::decode(encoded)
            .map_err(|err| format!("Failed to decode data URI: {}", err));
    }

    load_binary(&resolve_uri(base, uri))
}

pub fn resolve_uri(base: &Path, uri: &str) -> PathBuf {
    let decoded = uri.replace("%20", " ");
    let relative = Path::new(&decoded);
    if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        base.join(relative)
    }
}

fn truncate(uri: &str) -> &str {
    match uri.char_indices().nth(48) {
        Some((idx, _)) => &uri[..idx],
        None => uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_of_strips_file_name() {
        assert_eq!(
            directory_of(Path::new("assets/models/nanosuit/nanosuit.obj")),
            PathBuf::from("assets/models/nanosuit")
        );
        assert_eq!(directory_of(Path::new("rock.obj")), PathBuf::from("."));
    }

    #[test]
    fn data_uri_is_decoded() {
        let encoded = base64::encode([1u8, 2, 3, 4]);
        let uri = format!("data:application/octet-stream;base64,{}", encoded);
        let bytes = load_external_resource(Path::new("."), &uri).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn malformed_data_uri_is_an_error() {
        let err = load_external_resource(Path::new("."), "data:nocomma").unwrap_err();
        assert!(err.contains("Malformed data URI"));
    }

    #[test]
    fn relative_uris_resolve_against_base() {
        assert_eq!(
            resolve_uri(Path::new("models/box"), "textures/wood%20grain.png"),
            PathBuf::from("models/box/textures/wood grain.png")
        );
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = load_binary(Path::new("no/such/file.bin")).unwrap_err();
        assert!(err.contains("no/such/file.bin"));
    }
}
