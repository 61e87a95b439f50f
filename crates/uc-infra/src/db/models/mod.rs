mod clipboard_item;
mod device;
mod group_membership;

pub use clipboard_item::{ClipboardItemRow, NewClipboardItemRow};
pub use device::{DeviceRow, NewDeviceRow};
pub use group_membership::GroupMembershipRow;
