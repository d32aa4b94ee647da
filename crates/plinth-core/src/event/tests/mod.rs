
use crate::event::{Event, ExtensionEvent};

#[test]
fn test_extension_event_names_and_counts() {
    let event = ExtensionEvent::DiscoveryCompleted { count: 3, from_cache: true };
    assert_eq!(event.name(), "extension.discovered");
    assert_eq!(event.count(), 3);

    let booted = ExtensionEvent::Booted { count: 2 };
    assert_eq!(booted.name(), "extension.booted");
    assert_eq!(booted.as_any().downcast_ref::<ExtensionEvent>(), Some(&booted));
}
