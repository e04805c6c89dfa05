// Library root
// -----------
// The binary (`main.rs`) wires these modules into a single smoke run
// against a gophermart accrual service.
//
// Module responsibilities:
// - `api`: Blocking HTTP session and one method per service endpoint.
// - `fixtures`: The fixed user, order and withdrawal sent by the run.
// - `driver`: Runs the calls in order, prints a line per call and keeps
//   going when one of them fails.
pub mod api;
pub mod driver;
pub mod fixtures;
