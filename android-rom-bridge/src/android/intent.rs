//! Minimal JNI builder for `android.content.Intent`, covering the actions the
//! acquisition protocol needs to launch.

use jni::objects::{JObject, JValue};
use jni::JNIEnv;

use super::jni_utils::InternalResult;
use crate::UriPermissions;

/// Action to invoke with an intent.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    OpenDocument,
    OpenDocumentTree,
    View,
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &str {
        match self {
            Self::OpenDocument => "ACTION_OPEN_DOCUMENT",
            Self::OpenDocumentTree => "ACTION_OPEN_DOCUMENT_TREE",
            Self::View => "ACTION_VIEW",
        }
    }
}

/// Category added to an intent.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Category {
    Openable,
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        match self {
            Self::Openable => "CATEGORY_OPENABLE",
        }
    }
}

/// A messaging object used to request an action from another app component.
#[must_use]
pub(crate) struct Intent<'local> {
    object: JObject<'local>,
}

impl<'local> Intent<'local> {
    pub fn for_action(env: &mut JNIEnv<'local>, action: Action) -> InternalResult<Self> {
        let class = env.find_class("android/content/Intent")?;
        let action = env
            .get_static_field(&class, action.as_ref(), "Ljava/lang/String;")?
            .l()?;
        let object = env.new_object(&class, "(Ljava/lang/String;)V", &[JValue::Object(&action)])?;
        Ok(Self { object })
    }

    pub fn add_category(self, env: &mut JNIEnv<'local>, category: Category) -> InternalResult<Self> {
        let class = env.find_class("android/content/Intent")?;
        let value = env
            .get_static_field(&class, category.as_ref(), "Ljava/lang/String;")?
            .l()?;
        env.call_method(
            &self.object,
            "addCategory",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&value)],
        )?;
        Ok(self)
    }

    /// Sets an explicit MIME data type.
    pub fn with_type(self, env: &mut JNIEnv<'local>, mime: &str) -> InternalResult<Self> {
        let mime = env.new_string(mime)?;
        env.call_method(
            &self.object,
            "setType",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&mime)],
        )?;
        Ok(self)
    }

    pub fn add_flags(self, env: &mut JNIEnv<'local>, grants: UriPermissions) -> InternalResult<Self> {
        env.call_method(
            &self.object,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[grants.bits().into()],
        )?;
        Ok(self)
    }

    /// Targets an explicit component by package and fully qualified class
    /// name.
    pub fn set_class_name(
        self,
        env: &mut JNIEnv<'local>,
        package: &str,
        class_name: &str,
    ) -> InternalResult<Self> {
        let package = env.new_string(package)?;
        let class_name = env.new_string(class_name)?;
        env.call_method(
            &self.object,
            "setClassName",
            "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&package), JValue::Object(&class_name)],
        )?;
        Ok(self)
    }

    pub fn set_data_and_type(
        self,
        env: &mut JNIEnv<'local>,
        uri: &JObject<'_>,
        mime: &str,
    ) -> InternalResult<Self> {
        let mime = env.new_string(mime)?;
        env.call_method(
            &self.object,
            "setDataAndType",
            "(Landroid/net/Uri;Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(uri), JValue::Object(&mime)],
        )?;
        Ok(self)
    }

    /// Launches the intent via `startActivityForResult`; the result comes
    /// back through the activity's `onActivityResult` carrying
    /// `request_code`.
    pub fn start_for_result(
        self,
        env: &mut JNIEnv<'local>,
        activity: &JObject<'_>,
        request_code: i32,
    ) -> InternalResult<()> {
        env.call_method(
            activity,
            "startActivityForResult",
            "(Landroid/content/Intent;I)V",
            &[JValue::Object(&self.object), request_code.into()],
        )?;
        Ok(())
    }

    pub fn start(self, env: &mut JNIEnv<'local>, context: &JObject<'_>) -> InternalResult<()> {
        env.call_method(
            context,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[JValue::Object(&self.object)],
        )?;
        Ok(())
    }
}
