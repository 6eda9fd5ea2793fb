//! Property values and the sheet/key names the collision engine reads

/// Sheet holding physical dimensions
pub const SHEET_DIMENSIONS: &str = "dimensions";
/// Sheet holding wall construction values
pub const SHEET_WALL: &str = "wall";

/// Position, three floats
pub const KEY_POSITION: &str = "position";
/// Rotation, axis-angle `[x, y, z, angle]`
pub const KEY_ROTATION: &str = "rotation";
/// Scale, three floats
pub const KEY_SCALE: &str = "scale";
/// Model-space size, three floats
pub const KEY_SIZE: &str = "size";
/// Minimum physical extent per axis, three floats
pub const KEY_MINIMUM_EXTENT: &str = "minimumExtent";
/// Per-axis inflation of the bounding volume, three floats
pub const KEY_BOUNDS_BORDER: &str = "boundsBorder";
/// Wall thickness, list valued; the first element is used
pub const KEY_THICKNESS: &str = "thickness";
/// Vertex height, one float
pub const KEY_HEIGHT: &str = "height";

/// A typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A single number
    Float(f32),
    /// A list of numbers
    List(Vec<f32>),
    /// Free text
    Text(String),
    /// A flag
    Bool(bool),
}

impl PropertyValue {
    /// Build a three element list from a vector
    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Self::List(vec![x, y, z])
    }

    /// The value as a single number; a one element list also qualifies
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            Self::List(values) if values.len() == 1 => Some(values[0]),
            _ => None,
        }
    }

    /// The value as a list of exactly `N` numbers
    pub fn as_array<const N: usize>(&self) -> Option<[f32; N]> {
        match self {
            Self::List(values) => values.as_slice().try_into().ok(),
            _ => None,
        }
    }

    /// First element of a non-empty list, or the value of a float
    pub fn first(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            Self::List(values) => values.first().copied(),
            _ => None,
        }
    }

    /// Short description of the stored shape, for warnings
    pub fn shape(&self) -> String {
        match self {
            Self::Float(_) => "float".to_string(),
            Self::List(values) => format!("list of {}", values.len()),
            Self::Text(_) => "text".to_string(),
            Self::Bool(_) => "bool".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_requires_exact_length() {
        let value = PropertyValue::List(vec![1.0, 2.0, 3.0]);
        assert_eq!(value.as_array::<3>(), Some([1.0, 2.0, 3.0]));
        assert_eq!(value.as_array::<4>(), None);
        assert_eq!(PropertyValue::Float(1.0).as_array::<3>(), None);
    }

    #[test]
    fn test_first_of_list() {
        assert_eq!(PropertyValue::List(vec![0.2, 0.3]).first(), Some(0.2));
        assert_eq!(PropertyValue::List(vec![]).first(), None);
        assert_eq!(PropertyValue::Text("x".into()).first(), None);
    }
}
