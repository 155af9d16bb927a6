//! Input snapshots and ledger entities consumed by the checkout core

mod address;
mod cart;
mod customer;
mod discount;
mod product;
mod reservation;
mod shipment;
mod vendor;
mod voucher;

pub use address::{Address, Country};
pub use cart::{CheckoutContext, ShoppingCartItem};
pub use customer::Customer;
pub use discount::{Bid, Discount, DiscountUsage};
pub use product::Product;
pub use reservation::{ProductReservation, ReservationHold};
pub use shipment::{Shipment, ShipmentItem};
pub use vendor::Vendor;
pub use voucher::{GiftVoucher, GiftVoucherUsage};
