//! Bitflags of [`crate::pe::header::CoffHeader::characteristics`].

/// Relocation information was stripped from the file.
pub const IMAGE_FILE_RELOCS_STRIPPED: u16 = 0x0001;
/// The file is executable.
pub const IMAGE_FILE_EXECUTABLE_IMAGE: u16 = 0x0002;
/// COFF line numbers were stripped from the file.
pub const IMAGE_FILE_LINE_NUMS_STRIPPED: u16 = 0x0004;
/// COFF symbol table entries were stripped from the file.
pub const IMAGE_FILE_LOCAL_SYMS_STRIPPED: u16 = 0x0008;
/// Aggressively trim the working set.
pub const IMAGE_FILE_AGGRESSIVE_WS_TRIM: u16 = 0x0010;
/// The application can handle addresses larger than 2 GB.
pub const IMAGE_FILE_LARGE_ADDRESS_AWARE: u16 = 0x0020;
/// The bytes of the machine word are reversed (little endian).
pub const IMAGE_FILE_BYTES_REVERSED_LO: u16 = 0x0080;
/// The computer supports 32-bit words.
pub const IMAGE_FILE_32BIT_MACHINE: u16 = 0x0100;
/// Debugging information was removed and stored separately.
pub const IMAGE_FILE_DEBUG_STRIPPED: u16 = 0x0200;
/// If the image is on removable media, copy it to and run it from swap.
pub const IMAGE_FILE_REMOVABLE_RUN_FROM_SWAP: u16 = 0x0400;
/// If the image is on a network, copy it to and run it from swap.
pub const IMAGE_FILE_NET_RUN_FROM_SWAP: u16 = 0x0800;
/// The image is a system file, not a user program.
pub const IMAGE_FILE_SYSTEM: u16 = 0x1000;
/// The image is a dynamic-link library (DLL).
pub const IMAGE_FILE_DLL: u16 = 0x2000;
/// The file should be run only on a uniprocessor machine.
pub const IMAGE_FILE_UP_SYSTEM_ONLY: u16 = 0x4000;
/// The bytes of the machine word are reversed (big endian).
pub const IMAGE_FILE_BYTES_REVERSED_HI: u16 = 0x8000;

/// `true` iff [`IMAGE_FILE_DLL`] is set.
pub fn is_dll(characteristics: u16) -> bool {
    characteristics & IMAGE_FILE_DLL == IMAGE_FILE_DLL
}

/// `true` iff [`IMAGE_FILE_EXECUTABLE_IMAGE`] is set and [`is_dll`] is not.
pub fn is_exe(characteristics: u16) -> bool {
    characteristics & IMAGE_FILE_EXECUTABLE_IMAGE == IMAGE_FILE_EXECUTABLE_IMAGE
        && !is_dll(characteristics)
}

/// `true` iff [`IMAGE_FILE_SYSTEM`] is set (kernel-mode drivers).
pub fn is_driver(characteristics: u16) -> bool {
    characteristics & IMAGE_FILE_SYSTEM == IMAGE_FILE_SYSTEM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dll_and_exe_are_exclusive() {
        assert!(is_dll(IMAGE_FILE_DLL | IMAGE_FILE_EXECUTABLE_IMAGE));
        assert!(!is_exe(IMAGE_FILE_DLL | IMAGE_FILE_EXECUTABLE_IMAGE));
        assert!(is_exe(IMAGE_FILE_EXECUTABLE_IMAGE));
    }

    #[test]
    fn driver_is_a_system_file() {
        assert!(is_driver(IMAGE_FILE_SYSTEM));
        assert!(!is_driver(IMAGE_FILE_EXECUTABLE_IMAGE));
    }
}
