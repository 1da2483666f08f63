use std::fmt;
use crate::LoadError;

/**
 * Deconstructed path to a file.
 * "file://assets/classic.tmx" has protocol "file", body "assets/classic" and extension "tmx".
 */
#[derive(Clone, Eq, PartialEq, Default, Debug, Hash)]
pub struct AssetPath {
    pub protocol: String,
    pub body: String,
    pub extension: String,
}

impl AssetPath {

    pub fn parse(path: &str, default_protocol: Option<&str>) -> Result<Self, LoadError> {
        let protocol: Option<&str>;
        let mut remainder = path;

        // Reads protocol
        match remainder.split_once("://") {
            Some((left, right)) => {
                protocol = Some(left);
                remainder = right;
            },
            None => protocol = None,
        };
        let Some(protocol) = protocol.or(default_protocol) else {
            return Err(LoadError::NoDefaultProtocol)
        };

        // Extension only counts in the file name, not in directory names
        let name_start = remainder.rfind('/').map(|idx| idx + 1).unwrap_or(0);
        let (body, extension) = match remainder[name_start..].rfind('.') {
            Some(dot) if dot > 0 => remainder.split_at(name_start + dot),
            _ => return Err(LoadError::PathMissingExtension { path: String::from(path) }),
        };

        Ok(Self {
            protocol: protocol.into(),
            body: body.into(),
            extension: extension[1..].into(),
        })
    }

    /// Body and extension. No protocol.
    pub fn without_protocol(&self) -> String {
        format!("{}.{}", self.body, self.extension)
    }

    /// Name of the file, extension included.
    pub fn file_name(&self) -> String {
        let name = match self.body.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.body,
        };
        format!("{name}.{}", self.extension)
    }

    /// Parent directory of this file.
    /// None if it's at the root.
    pub fn parent(&self) -> Option<String> {
        let parts: Vec<&str> = self.body.split('/').collect();
        if parts.len() == 1 { return None }
        let parent_parts = &parts[..parts.len() - 1];
        let parent = match parent_parts.join("/") {
            root if root.is_empty() => String::from("/"),
            parent => parent,
        };
        Some(parent)
    }

    /// Resolves a path relative to the directory of this file.
    /// Keeps the protocol. Absolute paths are taken as is.
    pub fn join(&self, relative: &str) -> Result<Self, LoadError> {
        if relative.contains("://") {
            return Self::parse(relative, Some(&self.protocol));
        }
        let mut segments: Vec<&str> = match relative.starts_with('/') {
            true => vec![""],
            false => {
                let mut segments: Vec<&str> = self.body.split('/').collect();
                segments.pop();
                segments
            },
        };
        for segment in relative.split('/') {
            match segment {
                "" | "." => {},
                ".." => match segments.last() {
                    None | Some(&"..") => segments.push(".."),
                    Some(&"") => {},
                    Some(_) => { segments.pop(); },
                },
                _ => segments.push(segment),
            }
        }
        let joined = segments.join("/");
        Self::parse(&format!("{}://{}", self.protocol, joined), None)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}.{}", self.protocol, self.body, self.extension)
    }
}

#[cfg(test)]
mod test {
    use crate::LoadError;
    use super::AssetPath;

    #[test]
    fn parse() {
        let path = AssetPath::parse("assets/tileset_classic.tsx", Some("file")).unwrap();
        assert_eq!("file", path.protocol);
        assert_eq!("assets/tileset_classic", path.body);
        assert_eq!("tsx", path.extension);
        assert_eq!("file://assets/tileset_classic.tsx", path.to_string());
        assert_eq!("assets/tileset_classic.tsx", path.without_protocol());
        assert_eq!("tileset_classic.tsx", path.file_name());

        let path = AssetPath::parse("raw://levels.v2/first.tmx", None).unwrap();
        assert_eq!("raw", path.protocol);
        assert_eq!("levels.v2/first", path.body);
        assert_eq!("tmx", path.extension);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Err(LoadError::NoDefaultProtocol), AssetPath::parse("classic.tmx", None));
        assert!(matches!(
            AssetPath::parse("levels.v2/readme", Some("file")),
            Err(LoadError::PathMissingExtension { .. }),
        ));
        assert!(matches!(
            AssetPath::parse("assets/.hidden", Some("file")),
            Err(LoadError::PathMissingExtension { .. }),
        ));
    }

    #[test]
    fn parent() {
        let path = AssetPath::parse("assets/maps/classic.tmx", Some("file")).unwrap();
        assert_eq!(Some(String::from("assets/maps")), path.parent());
        let path = AssetPath::parse("classic.tmx", Some("file")).unwrap();
        assert_eq!(None, path.parent());
        let path = AssetPath::parse("file:///levels/classic.tmx", None).unwrap();
        assert_eq!(Some(String::from("/levels")), path.parent());
        let path = AssetPath::parse("file:///classic.tmx", None).unwrap();
        assert_eq!(Some(String::from("/")), path.parent());
    }

    #[test]
    fn join() {
        let map = AssetPath::parse("assets/maps/classic.tmx", Some("file")).unwrap();
        assert_eq!("file://assets/maps/classic.tsx", map.join("classic.tsx").unwrap().to_string());
        assert_eq!("file://assets/tileset_classic.tsx", map.join("../tileset_classic.tsx").unwrap().to_string());
        assert_eq!("file://assets/maps/sheet.png", map.join("./sheet.png").unwrap().to_string());
        assert_eq!("file:///opt/tiles.tsx", map.join("/opt/tiles.tsx").unwrap().to_string());

        let map = AssetPath::parse("classic.tmx", Some("file")).unwrap();
        assert_eq!("file://../shared/tiles.tsx", map.join("../shared/tiles.tsx").unwrap().to_string());

        let map = AssetPath::parse("/classic.tmx", Some("file")).unwrap();
        assert_eq!("file:///tiles.tsx", map.join("../tiles.tsx").unwrap().to_string());
    }
}
