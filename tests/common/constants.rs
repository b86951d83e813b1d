#![allow(dead_code)]

// Songs and artists

pub const SONG_1_ID: &str = "SOMZWCG12A8C13C480";
pub const SONG_1_TITLE: &str = "I Didn't Mean To";
pub const SONG_1_DURATION: f64 = 218.93179;

pub const SONG_2_ID: &str = "SOUDSGM12AC9618304";
pub const SONG_2_TITLE: &str = "Insatiable (Instrumental Version)";
pub const SONG_2_DURATION: f64 = 266.39628;

pub const ARTIST_1_ID: &str = "ARD7TVE1187B99BFB1";
pub const ARTIST_1_NAME: &str = "Casual";

pub const ARTIST_2_ID: &str = "ARNTLGG11E2835DDB9";
pub const ARTIST_2_NAME: &str = "Clp";

// Users

pub const USER_1_ID: i64 = 26;
pub const USER_2_ID: i64 = 97;

// 2018-11-08 00:32:06.796 UTC
pub const TS_1: i64 = 1541637126796;
pub const TS_1_START_TIME: &str = "2018-11-08 00:32:06.796";
pub const TS_2: i64 = 1541637226796;
pub const TS_3: i64 = 1541637326796;
pub const TS_4: i64 = 1541637426796;
