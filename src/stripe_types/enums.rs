// Stripe enum constants for type safety and consistency
// These constants replace magic strings throughout the codebase

// Payment Intent Statuses
pub const PAYMENT_INTENT_STATUS_SUCCEEDED: &str = "succeeded";
pub const PAYMENT_INTENT_STATUS_REQUIRES_PAYMENT_METHOD: &str = "requires_payment_method";
pub const PAYMENT_INTENT_STATUS_REQUIRES_CONFIRMATION: &str = "requires_confirmation";
pub const PAYMENT_INTENT_STATUS_REQUIRES_ACTION: &str = "requires_action";
pub const PAYMENT_INTENT_STATUS_PROCESSING: &str = "processing";
pub const PAYMENT_INTENT_STATUS_REQUIRES_CAPTURE: &str = "requires_capture";
pub const PAYMENT_INTENT_STATUS_CANCELED: &str = "canceled";

// Payment method types
pub const PAYMENT_METHOD_TYPE_CARD_PRESENT: &str = "card_present";

// Capture modes
pub const CAPTURE_METHOD_AUTOMATIC: &str = "automatic";

// The relay only charges in USD
pub const CURRENCY_USD: &str = "usd";

// Stripe error codes
pub const ERROR_CODE_RESOURCE_MISSING: &str = "resource_missing";
