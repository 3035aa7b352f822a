//! One instance of every packet variant, using boundary values where a
//! field has them.

#![allow(dead_code)]

use asciicraft_net::protocol::*;
use asciicraft_net::{
    BlockRecord, ChunkMeta, EntityMetadata, ExplosionRecord, ItemStack, MetadataEntry,
    MetadataValue, ObjectData,
};

fn stack() -> Option<ItemStack> {
    Some(ItemStack {
        id: i16::MAX,
        count: i8::MIN,
        damage: -1,
        nbt: Some(vec![0x1F, 0x8B, 0, 0]),
    })
}

fn metadata() -> EntityMetadata {
    EntityMetadata {
        entries: vec![
            MetadataEntry {
                index: 0,
                value: MetadataValue::Byte(0x21),
            },
            MetadataEntry {
                index: 1,
                value: MetadataValue::Short(300),
            },
            MetadataEntry {
                index: 6,
                value: MetadataValue::Int(i32::MIN),
            },
            MetadataEntry {
                index: 8,
                value: MetadataValue::Float(-0.5),
            },
            MetadataEntry {
                index: 5,
                value: MetadataValue::String(String::new()),
            },
            MetadataEntry {
                index: 10,
                value: MetadataValue::Slot(stack()),
            },
            MetadataEntry {
                index: 30,
                value: MetadataValue::Position(i32::MAX, 0, i32::MIN),
            },
        ],
    }
}

/// Every clientbound-or-serverbound variant, once.
pub fn sample_packets() -> Vec<Packet> {
    vec![
        KeepAlive { id: i32::MIN }.into(),
        LoginRequest {
            entity_id: i32::MAX,
            level_type: "default".into(),
            game_mode: 1,
            dimension: -1,
            difficulty: 3,
            unused: 0,
            max_players: 20,
        }
        .into(),
        Handshake {
            protocol_version: PROTOCOL_VERSION,
            username: "Notch".into(),
            host: "".into(),
            port: 25565,
        }
        .into(),
        ChatMessage {
            message: "§a\u{1F600}".into(),
        }
        .into(),
        TimeUpdate {
            age: i64::MAX,
            time: i64::MIN,
        }
        .into(),
        EntityEquipment {
            entity_id: 3,
            slot: 4,
            item: None,
        }
        .into(),
        SpawnPosition {
            x: i32::MIN,
            y: 64,
            z: i32::MAX,
        }
        .into(),
        UseEntity {
            user: 1,
            target: 2,
            left_click: true,
        }
        .into(),
        UpdateHealth {
            health: 0,
            food: 20,
            saturation: 5.0,
        }
        .into(),
        Respawn {
            dimension: 1,
            difficulty: 2,
            game_mode: 0,
            world_height: 256,
            level_type: "flat".into(),
        }
        .into(),
        Player { on_ground: false }.into(),
        PlayerPosition {
            x: f64::MAX,
            y: 0.0,
            stance: 1.62,
            z: f64::MIN,
            on_ground: true,
        }
        .into(),
        PlayerLook {
            yaw: -135.0,
            pitch: 90.0,
            on_ground: true,
        }
        .into(),
        PositionAndLook {
            x: -30_000_000.0,
            y: 64.0,
            stance: 65.62,
            z: 30_000_000.0,
            yaw: 180.0,
            pitch: -55.0,
            on_ground: true,
        }
        .into(),
        ServerPositionAndLook {
            x: 0.5,
            stance: 65.62,
            y: 64.0,
            z: 0.5,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
        }
        .into(),
        PlayerDigging {
            status: 2,
            x: -1,
            y: 255,
            z: 1,
            face: 5,
        }
        .into(),
        PlayerBlockPlacement {
            x: 10,
            y: 0,
            z: -10,
            direction: -1,
            held_item: stack(),
            cursor_x: 8,
            cursor_y: 16,
            cursor_z: 0,
        }
        .into(),
        HeldItemChange { slot: 8 }.into(),
        UseBed {
            entity_id: 9,
            unknown: 0,
            x: 1,
            y: 70,
            z: 2,
        }
        .into(),
        Animation {
            entity_id: 9,
            animation: 1,
        }
        .into(),
        EntityAction {
            entity_id: 9,
            action: 4,
        }
        .into(),
        SpawnNamedEntity {
            entity_id: 12,
            name: "jeb_".into(),
            x: 32,
            y: 2048,
            z: -32,
            yaw: i8::MIN,
            pitch: i8::MAX,
            current_item: 0,
            metadata: metadata(),
        }
        .into(),
        CollectItem {
            collected: 1,
            collector: 2,
        }
        .into(),
        SpawnObject {
            entity_id: 13,
            kind: 60,
            x: 0,
            y: 0,
            z: 0,
            pitch: 0,
            yaw: 0,
            data: ObjectData {
                data: 12,
                velocity: Some([i16::MIN, 0, i16::MAX]),
            },
        }
        .into(),
        SpawnObject {
            entity_id: 14,
            kind: 1,
            x: 1,
            y: 2,
            z: 3,
            pitch: 4,
            yaw: 5,
            data: ObjectData::default(),
        }
        .into(),
        SpawnMob {
            entity_id: 15,
            kind: 50,
            x: 32,
            y: 160,
            z: 0,
            pitch: 0,
            head_pitch: 0,
            yaw: 64,
            velocity_x: 0,
            velocity_y: -100,
            velocity_z: 0,
            metadata: EntityMetadata::default(),
        }
        .into(),
        SpawnPainting {
            entity_id: 16,
            title: "Kebab".into(),
            x: 0,
            y: 70,
            z: 0,
            direction: 2,
        }
        .into(),
        SpawnExperienceOrb {
            entity_id: 17,
            x: 0,
            y: 0,
            z: 0,
            count: 7,
        }
        .into(),
        EntityVelocity {
            entity_id: 18,
            velocity_x: 1,
            velocity_y: 2,
            velocity_z: 3,
        }
        .into(),
        DestroyEntity {
            entity_ids: vec![1, i32::MAX, i32::MIN],
        }
        .into(),
        DestroyEntity { entity_ids: vec![] }.into(),
        EntityIdle { entity_id: 19 }.into(),
        EntityRelativeMove {
            entity_id: 20,
            dx: i8::MIN,
            dy: 0,
            dz: i8::MAX,
        }
        .into(),
        EntityLook {
            entity_id: 21,
            yaw: 1,
            pitch: -1,
        }
        .into(),
        EntityLookAndRelativeMove {
            entity_id: 22,
            dx: 1,
            dy: 2,
            dz: 3,
            yaw: 4,
            pitch: 5,
        }
        .into(),
        EntityTeleport {
            entity_id: 23,
            x: i32::MIN,
            y: 0,
            z: i32::MAX,
            yaw: 0,
            pitch: 0,
        }
        .into(),
        EntityHeadLook {
            entity_id: 24,
            head_yaw: 100,
        }
        .into(),
        EntityStatus {
            entity_id: 25,
            status: 3,
        }
        .into(),
        AttachEntity {
            entity_id: 26,
            vehicle_id: -1,
        }
        .into(),
        EntityMetadataUpdate {
            entity_id: 27,
            metadata: metadata(),
        }
        .into(),
        EntityEffect {
            entity_id: 28,
            effect_id: 1,
            amplifier: 2,
            duration: 600,
        }
        .into(),
        RemoveEntityEffect {
            entity_id: 28,
            effect_id: 1,
        }
        .into(),
        SetExperience {
            bar: 0.25,
            level: 30,
            total: 1395,
        }
        .into(),
        ChunkData {
            x: -1,
            z: 1,
            ground_up: true,
            primary_bitmap: 0,
            add_bitmap: 0,
            data: vec![],
        }
        .into(),
        ChunkData {
            x: 0,
            z: 0,
            ground_up: false,
            primary_bitmap: 0x8001,
            add_bitmap: 0x0001,
            data: vec![0x78, 0x9C, 1, 2, 3],
        }
        .into(),
        MultiBlockChange {
            chunk_x: 2,
            chunk_z: -2,
            records: vec![BlockRecord::new(1, 64, 15, 1, 0), BlockRecord(u32::MAX)],
        }
        .into(),
        BlockChange {
            x: 0,
            y: 255,
            z: 0,
            block_id: 158,
            metadata: 15,
        }
        .into(),
        BlockAction {
            x: 1,
            y: 2,
            z: 3,
            byte1: 0,
            byte2: 1,
            block_id: 54,
        }
        .into(),
        BlockBreakAnimation {
            entity_id: 1,
            x: 1,
            y: 2,
            z: 3,
            stage: 9,
        }
        .into(),
        ChunkBulk {
            sky_light: true,
            data: vec![9; 40],
            columns: vec![
                ChunkMeta {
                    x: 0,
                    z: 0,
                    primary_bitmap: 1,
                    add_bitmap: 0,
                },
                ChunkMeta {
                    x: -1,
                    z: 5,
                    primary_bitmap: 0xFFFF,
                    add_bitmap: 0xFFFF,
                },
            ],
        }
        .into(),
        Explosion {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            radius: 4.0,
            records: vec![ExplosionRecord {
                dx: -1,
                dy: 0,
                dz: 1,
            }],
            motion_x: 0.1,
            motion_y: 0.2,
            motion_z: 0.3,
        }
        .into(),
        SoundOrParticleEffect {
            effect_id: 1000,
            x: 1,
            y: 2,
            z: 3,
            data: 0,
            disable_relative_volume: false,
        }
        .into(),
        NamedSoundEffect {
            name: "random.click".into(),
            x: 8,
            y: 16,
            z: 24,
            volume: 1.0,
            pitch: 63,
        }
        .into(),
        Particle {
            name: "flame".into(),
            x: 0.0,
            y: 1.0,
            z: 2.0,
            offset_x: 0.1,
            offset_y: 0.2,
            offset_z: 0.3,
            speed: 0.5,
            count: 10,
        }
        .into(),
        ChangeGameState {
            reason: 1,
            game_mode: 0,
        }
        .into(),
        SpawnGlobalEntity {
            entity_id: 30,
            kind: 1,
            x: 0,
            y: 0,
            z: 0,
        }
        .into(),
        OpenWindow {
            window_id: 1,
            inventory_type: 0,
            title: "Chest".into(),
            slots: 27,
            use_title: true,
        }
        .into(),
        CloseWindow { window_id: 1 }.into(),
        ClickWindow {
            window_id: 0,
            slot: 36,
            button: 0,
            action_number: 1,
            mode: 0,
            item: stack(),
        }
        .into(),
        SetSlot {
            window_id: -1,
            slot: -1,
            item: None,
        }
        .into(),
        WindowItems {
            window_id: 0,
            items: vec![None, stack(), None],
        }
        .into(),
        UpdateWindowProperty {
            window_id: 2,
            property: 0,
            value: 200,
        }
        .into(),
        ConfirmTransaction {
            window_id: 0,
            action_number: 5,
            accepted: false,
        }
        .into(),
        CreativeInventoryAction {
            slot: 36,
            item: stack(),
        }
        .into(),
        EnchantItem {
            window_id: 3,
            enchantment: 2,
        }
        .into(),
        UpdateSign {
            x: 1,
            y: 64,
            z: 1,
            line1: "".into(),
            line2: "two".into(),
            line3: "".into(),
            line4: "four".into(),
        }
        .into(),
        ItemData {
            item_type: 358,
            item_id: 0,
            data: vec![0; 131],
        }
        .into(),
        UpdateTileEntity {
            x: 0,
            y: 64,
            z: 0,
            action: 1,
            nbt: vec![],
        }
        .into(),
        IncrementStatistic {
            statistic_id: 1000,
            amount: 1,
        }
        .into(),
        PlayerListItem {
            name: "Dinnerbone".into(),
            online: true,
            ping: 42,
        }
        .into(),
        PlayerAbilities {
            flags: 0x0F,
            flying_speed: 12,
            walking_speed: 25,
        }
        .into(),
        TabComplete {
            text: "/he".into(),
        }
        .into(),
        ClientSettings {
            locale: "en_US".into(),
            view_distance: 0,
            chat_flags: 8,
            difficulty: 2,
            show_cape: true,
        }
        .into(),
        ClientStatuses { payload: 0 }.into(),
        ScoreboardObjective {
            name: "kills".into(),
            value: "Kills".into(),
            mode: 0,
        }
        .into(),
        UpdateScore::Set {
            item_name: "alice".into(),
            score_name: "kills".into(),
            value: -5,
        }
        .into(),
        UpdateScore::Remove {
            item_name: "alice".into(),
        }
        .into(),
        DisplayScoreboard {
            position: 1,
            name: "kills".into(),
        }
        .into(),
        Teams {
            name: "red".into(),
            mode: 0,
            info: Some(TeamInfo {
                display_name: "Red".into(),
                prefix: "[R]".into(),
                suffix: "".into(),
                friendly_fire: 1,
            }),
            players: Some(vec!["alice".into(), "bob".into()]),
        }
        .into(),
        Teams {
            name: "red".into(),
            mode: 4,
            info: None,
            players: Some(vec![]),
        }
        .into(),
        PluginMessage {
            channel: "MC|Brand".into(),
            data: b"vanilla".to_vec(),
        }
        .into(),
        EncryptionKeyResponse {
            shared_secret: vec![],
            verify_token: vec![],
        }
        .into(),
        EncryptionKeyRequest {
            server_id: "-".into(),
            public_key: vec![0x30; 162],
            verify_token: vec![1, 2, 3, 4],
        }
        .into(),
        ServerListPing { magic: 1 }.into(),
        Disconnect {
            reason: "Server closed".into(),
        }
        .into(),
    ]
}

/// Direction a sample should be decoded in.
pub fn direction_of(packet: &Packet) -> Direction {
    if packet.travels(Direction::Clientbound) {
        Direction::Clientbound
    } else {
        Direction::Serverbound
    }
}
