//! C ABI over a [`ConsentStore`] backed by in-memory storage and a headless document.
//!
//! Hosts create a store with [`consent_store_new`], drive it with the
//! `consent_*` calls and release it with [`consent_store_free`]. Every call
//! accepts a null handle and does nothing (or returns the "no" answer).

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::config::ConsentConfig;
use crate::consent::{ConsentStatus, ConsentStore, HeadlessDocument};
use crate::storage::StorageHandles;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct ConsentStoreHandle(*mut ConsentStore);

/// Status codes returned by [`consent_status`].
pub const CONSENT_STATUS_WAITING: i32 = 0;
pub const CONSENT_STATUS_ACCEPTED: i32 = 1;
pub const CONSENT_STATUS_REJECTED: i32 = 2;
pub const CONSENT_STATUS_INVALID_HANDLE: i32 = -1;

/// # Safety
/// `handle` must be null or come from [`consent_store_new`] and not be freed yet.
unsafe fn store_mut<'a>(handle: ConsentStoreHandle) -> Option<&'a mut ConsentStore> {
    handle.0.as_mut()
}

/// # Safety
/// `ptr` must be null or point at a NUL-terminated string.
unsafe fn identifier<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    match CStr::from_ptr(ptr).to_str() {
        Ok(s) => Some(s),
        Err(e) => {
            log::warn!("ffi: identifier is not valid UTF-8: {}", e);
            None
        }
    }
}

#[no_mangle]
pub extern "C" fn consent_store_new() -> ConsentStoreHandle {
    let mut store = ConsentStore::new(
        ConsentConfig::default(),
        StorageHandles::in_memory(),
        HeadlessDocument::default(),
    );
    store.initialize();
    ConsentStoreHandle(Box::into_raw(Box::new(store)))
}

/// # Safety
/// `handle` must be null or a live handle; `identifier` null or a C string.
#[no_mangle]
pub unsafe extern "C" fn consent_is_active(handle: ConsentStoreHandle, identifier_ptr: *const c_char) -> bool {
    match (store_mut(handle), identifier(identifier_ptr)) {
        (Some(store), Some(id)) => store.is_active(id),
        _ => false,
    }
}

/// # Safety
/// `handle` must be null or a live handle; `identifier` null or a C string.
#[no_mangle]
pub unsafe extern "C" fn consent_toggle(handle: ConsentStoreHandle, identifier_ptr: *const c_char) {
    if let (Some(store), Some(id)) = (store_mut(handle), identifier(identifier_ptr)) {
        store.toggle(id);
    }
}

/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn consent_accept_all(handle: ConsentStoreHandle) {
    if let Some(store) = store_mut(handle) {
        store.accept_all();
    }
}

/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn consent_reject_all(handle: ConsentStoreHandle) {
    if let Some(store) = store_mut(handle) {
        store.reject_all();
    }
}

/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn consent_save_preferences(handle: ConsentStoreHandle) {
    if let Some(store) = store_mut(handle) {
        store.save_preferences();
    }
}

/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn consent_reset(handle: ConsentStoreHandle) {
    if let Some(store) = store_mut(handle) {
        store.reset_to_default();
    }
}

/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn consent_status(handle: ConsentStoreHandle) -> i32 {
    match store_mut(handle).map(|s| s.status()) {
        Some(ConsentStatus::Waiting) => CONSENT_STATUS_WAITING,
        Some(ConsentStatus::Accepted) => CONSENT_STATUS_ACCEPTED,
        Some(ConsentStatus::Rejected) => CONSENT_STATUS_REJECTED,
        None => CONSENT_STATUS_INVALID_HANDLE,
    }
}

/// # Safety
/// `handle` must be null or a live handle; it is invalid afterwards.
#[no_mangle]
pub unsafe extern "C" fn consent_store_free(handle: ConsentStoreHandle) {
    if !handle.0.is_null() {
        drop(Box::from_raw(handle.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::ptr;

    #[test]
    fn drives_a_store_through_the_c_abi() {
        let handle = consent_store_new();
        let blur = CString::new("blur").unwrap();
        let google = CString::new("google").unwrap();

        unsafe {
            assert_eq!(consent_status(handle), CONSENT_STATUS_WAITING);
            assert!(consent_is_active(handle, google.as_ptr()));
            assert!(!consent_is_active(handle, blur.as_ptr()));

            consent_toggle(handle, blur.as_ptr());
            assert!(consent_is_active(handle, blur.as_ptr()));

            consent_save_preferences(handle);
            assert_eq!(consent_status(handle), CONSENT_STATUS_ACCEPTED);

            consent_reject_all(handle);
            assert_eq!(consent_status(handle), CONSENT_STATUS_REJECTED);
            assert!(!consent_is_active(handle, blur.as_ptr()));

            consent_accept_all(handle);
            assert!(consent_is_active(handle, blur.as_ptr()));

            consent_reset(handle);
            assert_eq!(consent_status(handle), CONSENT_STATUS_WAITING);

            consent_store_free(handle);
        }
    }

    #[test]
    fn null_handles_and_identifiers_are_tolerated() {
        let null = ConsentStoreHandle(ptr::null_mut());
        let blur = CString::new("blur").unwrap();

        unsafe {
            assert_eq!(consent_status(null), CONSENT_STATUS_INVALID_HANDLE);
            assert!(!consent_is_active(null, blur.as_ptr()));
            consent_toggle(null, blur.as_ptr());
            consent_accept_all(null);
            consent_store_free(null);

            let handle = consent_store_new();
            assert!(!consent_is_active(handle, ptr::null()));
            consent_toggle(handle, ptr::null());
            consent_store_free(handle);
        }
    }
}
