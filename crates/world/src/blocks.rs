//! Block registry for ids 0..=158: display name, glyph and movement flags.

use bitflags::bitflags;

use crate::chunk::BlockId;

bitflags! {
    /// Physical traits the movement controller and renderer care about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u8 {
        /// Occupies its voxel: cannot be walked through, can be stood on.
        const SOLID = 0b0000_0001;
        /// Ladders and vines.
        const CLIMBABLE = 0b0000_0010;
        /// Water and lava.
        const LIQUID = 0b0000_0100;
        /// Drawn but lets the depth walk look past it.
        const SEE_THROUGH = 0b0000_1000;
    }
}

/// Static description of a block id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub id: BlockId,
    pub name: &'static str,
    pub glyph: char,
    pub flags: BlockFlags,
}

impl BlockInfo {
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.flags.contains(BlockFlags::SOLID)
    }

    #[inline]
    pub fn is_climbable(&self) -> bool {
        self.flags.contains(BlockFlags::CLIMBABLE)
    }

    #[inline]
    pub fn is_liquid(&self) -> bool {
        self.flags.contains(BlockFlags::LIQUID)
    }
}

pub const BLOCK_STONE: BlockId = 1;
pub const BLOCK_GRASS: BlockId = 2;
pub const BLOCK_DIRT: BlockId = 3;
pub const BLOCK_COBBLESTONE: BlockId = 4;
pub const BLOCK_WATER: BlockId = 9;
pub const BLOCK_SAND: BlockId = 12;
pub const BLOCK_LOG: BlockId = 17;
pub const BLOCK_TORCH: BlockId = 50;
pub const BLOCK_LADDER: BlockId = 65;
pub const BLOCK_VINE: BlockId = 106;

const NONE: BlockFlags = BlockFlags::empty();
const S: BlockFlags = BlockFlags::SOLID;
const ST: BlockFlags = BlockFlags::SOLID.union(BlockFlags::SEE_THROUGH);
const C: BlockFlags = BlockFlags::CLIMBABLE;
const L: BlockFlags = BlockFlags::LIQUID;

const fn b(id: BlockId, name: &'static str, glyph: char, flags: BlockFlags) -> BlockInfo {
    BlockInfo {
        id,
        name,
        glyph,
        flags,
    }
}

/// Registry entry for ids outside the table.
pub const UNKNOWN_BLOCK: BlockInfo = b(BlockId::MAX, "unknown", '?', S);

static BLOCKS: [BlockInfo; 159] = [
    b(0, "air", ' ', NONE),
    b(1, "stone", '█', S),
    b(2, "grass", '"', S),
    b(3, "dirt", '▓', S),
    b(4, "cobblestone", '▒', S),
    b(5, "planks", '=', S),
    b(6, "sapling", 'ፑ', NONE),
    b(7, "bedrock", '▒', S),
    b(8, "flowing water", '~', L),
    b(9, "water", '≈', L),
    b(10, "flowing lava", '~', L),
    b(11, "lava", '≈', L),
    b(12, "sand", '░', S),
    b(13, "gravel", '#', S),
    b(14, "gold ore", '&', S),
    b(15, "iron ore", '&', S),
    b(16, "coal ore", '&', S),
    b(17, "log", 'O', S),
    b(18, "leaves", '░', ST),
    b(19, "sponge", '▒', S),
    b(20, "glass", '‘', ST),
    b(21, "lapis ore", '&', S),
    b(22, "lapis block", '■', S),
    b(23, "dispenser", '⌸', S),
    b(24, "sandstone", '█', S),
    b(25, "note block", '♪', S),
    b(26, "bed", '▄', S),
    b(27, "powered rail", '║', NONE),
    b(28, "detector rail", '║', NONE),
    b(29, "sticky piston", '●', S),
    b(30, "cobweb", 'Ж', NONE),
    b(31, "tall grass", '⍦', NONE),
    b(32, "dead bush", '⍦', NONE),
    b(33, "piston", '○', S),
    b(34, "piston head", '•', S),
    b(35, "wool", '░', S),
    b(36, "moving piston", '•', NONE),
    b(37, "dandelion", '❀', NONE),
    b(38, "rose", '⚘', NONE),
    b(39, "brown mushroom", 'Ⱄ', NONE),
    b(40, "red mushroom", 'Ⱄ', NONE),
    b(41, "gold block", '■', S),
    b(42, "iron block", '■', S),
    b(43, "double slab", '─', S),
    b(44, "slab", '▄', S),
    b(45, "bricks", '▤', S),
    b(46, "tnt", 'T', S),
    b(47, "bookshelf", '▤', S),
    b(48, "mossy cobblestone", '▒', S),
    b(49, "obsidian", '▒', S),
    b(50, "torch", '༈', NONE),
    b(51, "fire", '‼', NONE),
    b(52, "monster spawner", '#', ST),
    b(53, "oak stairs", '▙', S),
    b(54, "chest", '⌺', S),
    b(55, "redstone wire", '┼', NONE),
    b(56, "diamond ore", '◆', S),
    b(57, "diamond block", '■', S),
    b(58, "crafting table", '#', S),
    b(59, "wheat", '"', NONE),
    b(60, "farmland", '≡', S),
    b(61, "furnace", '⌸', S),
    b(62, "lit furnace", '⌸', S),
    b(63, "sign", '▬', NONE),
    b(64, "wooden door", '+', NONE),
    b(65, "ladder", 'H', C),
    b(66, "rail", '║', NONE),
    b(67, "cobblestone stairs", '▙', S),
    b(68, "wall sign", '▬', NONE),
    b(69, "lever", '/', NONE),
    b(70, "stone pressure plate", '⎽', NONE),
    b(71, "iron door", '+', NONE),
    b(72, "wooden pressure plate", '⎽', NONE),
    b(73, "redstone ore", '&', S),
    b(74, "glowing redstone ore", '&', S),
    b(75, "redstone torch", '༈', NONE),
    b(76, "lit redstone torch", '༈', NONE),
    b(77, "stone button", '▪', NONE),
    b(78, "snow", '▁', NONE),
    b(79, "ice", '▒', ST),
    b(80, "snow block", '▒', S),
    b(81, "cactus", '⊪', S),
    b(82, "clay", '▒', S),
    b(83, "sugar cane", '⊪', NONE),
    b(84, "jukebox", '♫', S),
    b(85, "fence", '┼', S),
    b(86, "pumpkin", 'ϖ', S),
    b(87, "netherrack", '▒', S),
    b(88, "soul sand", '▒', S),
    b(89, "glowstone", '▒', S),
    b(90, "portal", '▋', NONE),
    b(91, "jack o'lantern", 'ϖ', S),
    b(92, "cake", '░', S),
    b(93, "repeater", '⍐', NONE),
    b(94, "lit repeater", '⍐', NONE),
    b(95, "locked chest", '⌺', S),
    b(96, "trapdoor", '▭', NONE),
    b(97, "monster egg", '█', S),
    b(98, "stone bricks", '▞', S),
    b(99, "huge brown mushroom", '▀', S),
    b(100, "huge red mushroom", '▀', S),
    b(101, "iron bars", '┼', ST),
    b(102, "glass pane", '┼', ST),
    b(103, "melon", '◍', S),
    b(104, "pumpkin stem", '⸽', NONE),
    b(105, "melon stem", '⸽', NONE),
    b(106, "vine", '⸾', C),
    b(107, "fence gate", '╫', NONE),
    b(108, "brick stairs", '▙', S),
    b(109, "stone brick stairs", '▙', S),
    b(110, "mycelium", '"', S),
    b(111, "lily pad", '◦', NONE),
    b(112, "nether brick", '▞', S),
    b(113, "nether brick fence", '┼', S),
    b(114, "nether brick stairs", '▙', S),
    b(115, "nether wart", '⸙', NONE),
    b(116, "enchantment table", '⌂', S),
    b(117, "brewing stand", 'ɸ', S),
    b(118, "cauldron", '∪', S),
    b(119, "end portal", '▋', NONE),
    b(120, "end portal frame", '▣', S),
    b(121, "end stone", '▒', S),
    b(122, "dragon egg", '●', S),
    b(123, "redstone lamp", '☼', S),
    b(124, "lit redstone lamp", '☼', S),
    b(125, "wooden double slab", '─', S),
    b(126, "wooden slab", '▄', S),
    b(127, "cocoa", '◎', NONE),
    b(128, "sandstone stairs", '▙', S),
    b(129, "emerald ore", '&', S),
    b(130, "ender chest", '⌺', S),
    b(131, "tripwire hook", '⊸', NONE),
    b(132, "tripwire", '·', NONE),
    b(133, "emerald block", '■', S),
    b(134, "spruce stairs", '▙', S),
    b(135, "birch stairs", '▙', S),
    b(136, "jungle stairs", '▙', S),
    b(137, "command block", '⌘', S),
    b(138, "beacon", '✦', ST),
    b(139, "cobblestone wall", '┼', S),
    b(140, "flower pot", 'ų', NONE),
    b(141, "carrots", '"', NONE),
    b(142, "potatoes", '"', NONE),
    b(143, "wooden button", '▪', NONE),
    b(144, "head", '☻', NONE),
    b(145, "anvil", 'σ', S),
    b(146, "trapped chest", '⌺', S),
    b(147, "gold pressure plate", '⎽', NONE),
    b(148, "iron pressure plate", '⎽', NONE),
    b(149, "comparator", '⍐', NONE),
    b(150, "lit comparator", '⍐', NONE),
    b(151, "daylight sensor", '▁', S),
    b(152, "redstone block", '■', S),
    b(153, "quartz ore", '&', S),
    b(154, "hopper", '▼', S),
    b(155, "quartz block", '█', S),
    b(156, "quartz stairs", '▙', S),
    b(157, "activator rail", '║', NONE),
    b(158, "dropper", '⌸', S),
];

/// Registry entry for `id`; unknown ids render as `?` and count as solid.
pub fn block_info(id: BlockId) -> &'static BlockInfo {
    BLOCKS.get(id as usize).unwrap_or(&UNKNOWN_BLOCK)
}

/// Glyph for a block, taking orientation metadata into account where the
/// shape is visible from above (rails).
pub fn glyph_for(id: BlockId, metadata: u8) -> char {
    match id {
        27 | 28 | 157 => rail_glyph(metadata & 0b0111),
        66 => rail_glyph(metadata),
        _ => block_info(id).glyph,
    }
}

fn rail_glyph(shape: u8) -> char {
    match shape {
        0 | 4 | 5 => '║',
        1..=3 => '═',
        6 => '╔',
        7 => '╗',
        8 => '╝',
        9 => '╚',
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_id() {
        for (index, info) in BLOCKS.iter().enumerate() {
            assert_eq!(info.id as usize, index, "{} out of place", info.name);
        }
    }

    #[test]
    fn air_and_plants_are_passable() {
        assert!(!block_info(0).is_solid());
        assert!(!block_info(31).is_solid());
        assert!(!block_info(50).is_solid());
        assert!(block_info(BLOCK_STONE).is_solid());
    }

    #[test]
    fn ladders_and_vines_climb() {
        assert!(block_info(BLOCK_LADDER).is_climbable());
        assert!(block_info(BLOCK_VINE).is_climbable());
        assert!(!block_info(BLOCK_DIRT).is_climbable());
    }

    #[test]
    fn liquids_are_flagged() {
        assert!(block_info(BLOCK_WATER).is_liquid());
        assert!(block_info(11).is_liquid());
        assert!(!block_info(BLOCK_WATER).is_solid());
    }

    #[test]
    fn unknown_ids_fall_back() {
        let info = block_info(400);
        assert_eq!(info.glyph, '?');
        assert!(info.is_solid());
    }

    #[test]
    fn rail_shapes() {
        assert_eq!(glyph_for(66, 1), '═');
        assert_eq!(glyph_for(66, 6), '╔');
        // Powered bit does not change the shape.
        assert_eq!(glyph_for(27, 0b1001), '═');
        assert_eq!(glyph_for(BLOCK_STONE, 3), '█');
    }
}
