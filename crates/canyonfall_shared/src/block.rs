use serde::{Deserialize, Serialize};

/// Material stored in a voxel cell. `Air` is the empty sentinel and always zero.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[default]
    Air = 0,
    Stone = 1,
    Dirt = 2,
    Grass = 3,
    Water = 4,
    Wood = 5,
    Leaves = 6,
    Sand = 7,
    Gravel = 8,
    Clay = 9,
    Bedrock = 10,
}

impl BlockType {
    pub const ALL: [BlockType; 11] = [
        BlockType::Air,
        BlockType::Stone,
        BlockType::Dirt,
        BlockType::Grass,
        BlockType::Water,
        BlockType::Wood,
        BlockType::Leaves,
        BlockType::Sand,
        BlockType::Gravel,
        BlockType::Clay,
        BlockType::Bedrock,
    ];

    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn is_air(self) -> bool {
        self == BlockType::Air
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Air => "air",
            BlockType::Stone => "stone",
            BlockType::Dirt => "dirt",
            BlockType::Grass => "grass",
            BlockType::Water => "water",
            BlockType::Wood => "wood",
            BlockType::Leaves => "leaves",
            BlockType::Sand => "sand",
            BlockType::Gravel => "gravel",
            BlockType::Clay => "clay",
            BlockType::Bedrock => "bedrock",
        }
    }

    /// Character used by the ASCII cross-section dump.
    pub fn symbol(self) -> char {
        match self {
            BlockType::Air => ' ',
            BlockType::Stone => '#',
            BlockType::Grass => '~',
            BlockType::Dirt => '.',
            BlockType::Bedrock => 'B',
            BlockType::Sand => 's',
            BlockType::Gravel => 'g',
            BlockType::Clay => 'c',
            BlockType::Water => 'w',
            BlockType::Wood => 'W',
            BlockType::Leaves => 'L',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BlockType;

    #[test]
    fn ids_round_trip_and_air_is_zero() {
        assert_eq!(BlockType::Air.id(), 0);
        assert_eq!(BlockType::default(), BlockType::Air);
        for block in BlockType::ALL {
            assert_eq!(BlockType::from_u8(block.id()), Some(block));
        }
        assert_eq!(BlockType::from_u8(11), None);
    }

    #[test]
    fn symbols_match_cross_section_legend() {
        assert_eq!(BlockType::Air.symbol(), ' ');
        assert_eq!(BlockType::Stone.symbol(), '#');
        assert_eq!(BlockType::Grass.symbol(), '~');
        assert_eq!(BlockType::Dirt.symbol(), '.');
        assert_eq!(BlockType::Bedrock.symbol(), 'B');
    }
}
