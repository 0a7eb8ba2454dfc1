//! In-memory DICOM objects for tests

use super::DicomFile;
use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::dictionary_std::{tags, uids};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};

pub(crate) fn element(tag: Tag, vr: VR, value: PrimitiveValue) -> DataElement<InMemDicomObject> {
    DataElement::new(tag, vr, value)
}

pub(crate) fn words(values: &[u16]) -> PrimitiveValue {
    PrimitiveValue::U16(values.to_vec().into())
}

/// Single-frame secondary capture in explicit VR little endian
///
/// `layout` is (bits allocated, bits stored, high bit, pixel representation).
pub(crate) fn build(
    photometric: &str,
    (rows, cols): (u16, u16),
    (bits_allocated, bits_stored, high_bit, representation): (u16, u16, u16, u16),
    pixels: PrimitiveValue,
    extra: Vec<DataElement<InMemDicomObject>>,
) -> DicomFile {
    let pixel_vr = if bits_allocated == 8 { VR::OB } else { VR::OW };
    let mut obj = InMemDicomObject::from_element_iter([
        element(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
        ),
        element(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from("2.25.1")),
        element(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        element(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, PrimitiveValue::from(photometric)),
        element(tags::ROWS, VR::US, PrimitiveValue::from(rows)),
        element(tags::COLUMNS, VR::US, PrimitiveValue::from(cols)),
        element(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(bits_allocated)),
        element(tags::BITS_STORED, VR::US, PrimitiveValue::from(bits_stored)),
        element(tags::HIGH_BIT, VR::US, PrimitiveValue::from(high_bit)),
        element(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(representation)),
        element(tags::PIXEL_DATA, pixel_vr, pixels),
    ]);
    for e in extra {
        obj.put(e);
    }

    obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
            .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
            .media_storage_sop_instance_uid("2.25.1"),
    )
    .unwrap()
}
