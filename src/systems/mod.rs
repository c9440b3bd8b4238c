pub mod breeding;
pub mod feeding;
pub mod homekill;
pub mod slaughter;
