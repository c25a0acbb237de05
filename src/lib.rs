pub mod db_inspect;
pub mod map_convert;
pub mod scoring;
pub mod seqid_map;
pub mod utilities;
