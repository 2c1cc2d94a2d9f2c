pub use address_book::{PeripheryAddress, TokenAddressAvalanche};
pub use format::format_token_amount;
pub use position::{Position, ResolvedPosition};
pub use token::TokenMeta;
pub use token_list::get_token_meta;

mod address_book;
mod format;
mod position;
mod token;
mod token_list;
