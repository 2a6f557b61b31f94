//! Database schema definitions.

/// SQL schema for the schedule database.
pub const SCHEMA_SQL: &str = r#"
-- Channel table
CREATE TABLE IF NOT EXISTS channels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    display_name TEXT NOT NULL,
    media_type INTEGER NOT NULL DEFAULT 0,   -- 0=TV, 1=Radio
    -- EPG grab state
    grab_epg INTEGER DEFAULT 1,              -- Selected for EPG grabbing
    epg_has_gaps INTEGER DEFAULT 0,          -- Last grab left holes in the schedule
    last_grab_time INTEGER,                  -- Last successful grab (unix seconds)
    -- Metadata
    created_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- Tuning details (one channel may be received on several transponders)
CREATE TABLE IF NOT EXISTS tuning_details (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    channel_id INTEGER NOT NULL,
    standard TEXT NOT NULL,                  -- 'dvb-c', 'dvb-s', 'dvb-t', 'atsc', 'isdb'
    network_id INTEGER NOT NULL,
    transport_id INTEGER NOT NULL,
    service_id INTEGER NOT NULL,
    UNIQUE(network_id, transport_id, service_id),
    FOREIGN KEY(channel_id) REFERENCES channels(id) ON DELETE CASCADE
);

-- Program categories (genre names)
CREATE TABLE IF NOT EXISTS program_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
);

-- Program schedule
CREATE TABLE IF NOT EXISTS programs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    channel_id INTEGER NOT NULL,
    start_time INTEGER NOT NULL,             -- unix seconds
    end_time INTEGER NOT NULL,               -- unix seconds
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    category_id INTEGER,
    star_rating INTEGER DEFAULT 0,           -- 0..7
    classification TEXT NOT NULL DEFAULT '',
    parental_rating INTEGER DEFAULT -1,      -- -1 = unknown
    state INTEGER DEFAULT 0,                 -- ProgramState bit set
    CHECK (start_time < end_time),
    FOREIGN KEY(channel_id) REFERENCES channels(id) ON DELETE CASCADE,
    FOREIGN KEY(category_id) REFERENCES program_categories(id) ON DELETE SET NULL
);

-- Key/value settings
CREATE TABLE IF NOT EXISTS settings (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_tuning_details_channel ON tuning_details(channel_id);
CREATE INDEX IF NOT EXISTS idx_programs_channel_start ON programs(channel_id, start_time);
CREATE INDEX IF NOT EXISTS idx_programs_channel_slot ON programs(channel_id, start_time, end_time);
"#;
