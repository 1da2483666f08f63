use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use roxmltree::Node;
use crate::tileset::{parse, properties_from_parsed, Properties};
use super::{Gid, MapError};

/// A finite layer of tiles, stored row by row.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub properties: Properties,
    pub data: Vec<Gid>,
}

impl TileLayer {

    /// Tile at the coordinates specified.
    /// None if out of bounds.
    pub fn gid_at(&self, x: i32, y: i32) -> Option<Gid> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.data.get(idx).copied()
    }

    /// Coordinates and tile of every cell, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, Gid)> + '_ {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, gid)| (idx as u32 % width, idx as u32 / width, *gid))
    }

    pub(crate) fn parse(layer_node: Node) -> Result<Self, MapError> {
        let mut layer = Self::default();
        for attribute in layer_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "name" => layer.name = String::from(value),
                "width" => layer.width = parse::number(name, value)?,
                "height" => layer.height = parse::number(name, value)?,
                _ => {}
            }
        }
        for node in layer_node.children() {
            match node.tag_name().name() {
                "properties" => layer.properties = properties_from_parsed(parse::parse_properties(node)?)?,
                "data" => layer.data = parse_data(node)?,
                _ => {}
            }
        }
        layer.check_size()?;
        Ok(layer)
    }

    pub(crate) fn check_size(&self) -> Result<(), MapError> {
        let expected = self.width as usize * self.height as usize;
        if self.data.len() != expected {
            return Err(MapError::LayerSizeMismatch {
                name: self.name.clone(),
                expected,
                found: self.data.len(),
            });
        }
        Ok(())
    }
}

fn parse_data(data_node: Node) -> Result<Vec<Gid>, MapError> {
    if let Some(compression) = data_node.attribute("compression") {
        if !compression.is_empty() {
            return Err(MapError::UnsupportedCompression { compression: String::from(compression) });
        }
    }
    let text = data_node.text().unwrap_or_default();
    match data_node.attribute("encoding") {
        Some("csv") => decode_csv(text),
        Some("base64") => decode_base64(text),
        Some(encoding) => Err(MapError::UnsupportedEncoding { encoding: String::from(encoding) }),
        // Plain XML, one <tile> per cell
        None => data_node
            .children()
            .filter(|node| node.has_tag_name("tile"))
            .map(|tile_node| match tile_node.attribute("gid") {
                Some(gid) => Ok(Gid(parse::number("gid", gid)?)),
                None => Ok(Gid::EMPTY),
            })
            .collect(),
    }
}

/// Comma separated ids, with any amount of whitespace between them.
pub(crate) fn decode_csv(text: &str) -> Result<Vec<Gid>, MapError> {
    text
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value
            .parse()
            .map(Gid)
            .map_err(|_| MapError::InvalidGid { value: String::from(value) })
        )
        .collect()
}

/// Base64 of little-endian u32s.
pub(crate) fn decode_base64(text: &str) -> Result<Vec<Gid>, MapError> {
    let bytes = STANDARD.decode(text.trim())?;
    if bytes.len() % 4 != 0 {
        return Err(MapError::InvalidGid { value: format!("{} trailing bytes", bytes.len() % 4) });
    }
    let gids = bytes
        .chunks_exact(4)
        .map(|chunk| Gid(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])))
        .collect();
    Ok(gids)
}

#[cfg(test)]
mod test {
    use roxmltree::Document;
    use crate::map::{Gid, MapError};
    use super::{decode_base64, decode_csv, TileLayer};

    fn parse_layer(xml: &str) -> Result<TileLayer, MapError> {
        let doc = Document::parse(xml).unwrap();
        TileLayer::parse(doc.root_element())
    }

    #[test]
    fn csv() {
        let gids = decode_csv("\n1,2,0,\n3,2147483652,1\n").unwrap();
        assert_eq!(vec![Gid(1), Gid(2), Gid(0), Gid(3), Gid(0x80000004), Gid(1)], gids);
        assert!(matches!(decode_csv("1,x"), Err(MapError::InvalidGid { .. })));
    }

    #[test]
    fn base64() {
        // 1, 2, 0 as little-endian u32s
        let gids = decode_base64(" AQAAAAIAAAAAAAAA\n").unwrap();
        assert_eq!(vec![Gid(1), Gid(2), Gid(0)], gids);
        assert!(matches!(decode_base64("AQAA"), Err(MapError::InvalidGid { .. })));
        assert!(matches!(decode_base64("!!"), Err(MapError::Base64(_))));
    }

    #[test]
    fn layer_encodings() {
        let csv = parse_layer(r#"<layer name="blocks" width="2" height="2"><data encoding="csv">1,0,0,2</data></layer>"#).unwrap();
        let xml = parse_layer(r#"<layer name="blocks" width="2" height="2"><data><tile gid="1"/><tile/><tile/><tile gid="2"/></data></layer>"#).unwrap();
        assert_eq!(csv, xml);
        assert_eq!(Some(Gid(2)), csv.gid_at(1, 1));
        assert_eq!(None, csv.gid_at(2, 0));
        assert_eq!(None, csv.gid_at(0, -1));
        assert_eq!(vec![(0, 0, Gid(1)), (1, 0, Gid(0)), (0, 1, Gid(0)), (1, 1, Gid(2))], csv.iter().collect::<Vec<_>>());
    }

    #[test]
    fn layer_errors() {
        let compressed = parse_layer(r#"<layer width="1" height="1"><data encoding="base64" compression="zlib">eJw=</data></layer>"#);
        assert!(matches!(compressed, Err(MapError::UnsupportedCompression { compression }) if compression == "zlib"));
        let short = parse_layer(r#"<layer name="short" width="2" height="2"><data encoding="csv">1,2,3</data></layer>"#);
        assert!(matches!(short, Err(MapError::LayerSizeMismatch { expected: 4, found: 3, .. })));
    }
}
