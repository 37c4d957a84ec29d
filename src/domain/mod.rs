pub mod feed;
pub mod item;
pub mod note;

pub use feed::Feed;
pub use item::Item;
pub use note::NoteCard;
