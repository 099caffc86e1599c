//! Spoken rendering of routes and scan events

/// Turn a route into a single spoken instruction.
///
/// The destination is named first, intermediate stops follow in path order.
pub fn narrate<S: AsRef<str>>(path: &[S]) -> String {
    if path.len() < 2 {
        return "Cannot generate route. You may already be at your destination.".to_string();
    }

    let destination = path[path.len() - 1].as_ref();
    let mut narration = format!("To get to your destination, {}. ", destination);

    if path.len() == 2 {
        narration.push_str("You can proceed directly there.");
        return narration;
    }

    let stops: Vec<&str> = path[1..path.len() - 1].iter().map(AsRef::as_ref).collect();
    narration.push_str("You will need to pass by ");
    narration.push_str(&stops.join(", then "));
    narration.push_str(", before arriving at your final destination.");
    narration
}

pub fn location_found(location: &str) -> String {
    format!("Location found. You are at {}", location)
}

pub fn destination_assigned(destination: &str) -> String {
    format!("Your destination is {}", destination)
}

pub const SCANNER_STARTED: &str = "Starting scanner. Please pan your camera around to find a QR code.";
pub const CAMERA_LOST: &str = "Camera feed lost.";
pub const SCAN_CANCELLED: &str = "Scanning cancelled.";
pub const NO_ROUTE: &str = "Could not compute a route.";
pub const ALREADY_THERE: &str = "You are already at your destination.";
pub const NOT_UNDERSTOOD: &str = "Sorry, I could not understand you. Please try again from the main menu.";
pub const ASK_DESTINATION: &str = "Please say your desired destination now.";
